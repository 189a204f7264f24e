use std::path::PathBuf;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading or parsing entity data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A data file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A data file is not valid JSON.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A table file parsed, but is not a list of row objects.
    #[error("table \"{0}\" must be a JSON array of objects")]
    InvalidTable(String),

    /// A single field value could not be parsed.
    #[error("field \"{field}\" has invalid value \"{value}\": {reason}")]
    InvalidField {
        /// The field name.
        field: String,
        /// The raw value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}
