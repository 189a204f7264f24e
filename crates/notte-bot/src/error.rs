use std::path::PathBuf;

/// Alias for `Result<T, BotError>`.
pub type BotResult<T> = Result<T, BotError>;

/// Errors that stop a bot command or the bot itself.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a bot config.
    #[error("invalid config {path}: {source}")]
    Config {
        /// The config file.
        path: PathBuf,
        /// The parse error.
        source: toml::de::Error,
    },

    /// A config value is out of range.
    #[error("invalid config value for {key}: {reason}")]
    ConfigValue {
        /// The offending key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The state file is not valid JSON.
    #[error("invalid state file {path}: {source}")]
    State {
        /// The state file.
        path: PathBuf,
        /// The parse error.
        source: serde_json::Error,
    },

    /// Writing to the console failed.
    #[error("output failed: {0}")]
    Output(#[from] std::io::Error),

    /// A background task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),

    /// Entity data could not be loaded.
    #[error(transparent)]
    Data(#[from] notte_core::CoreError),

    /// The query index could not be built.
    #[error(transparent)]
    Query(#[from] notte_query::QueryError),

    /// A summon command failed.
    #[error(transparent)]
    Summon(#[from] notte_summon::SummonError),

    /// The news feed could not be read.
    #[error(transparent)]
    News(#[from] notte_news::NewsError),
}

impl From<tokio::task::JoinError> for BotError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
