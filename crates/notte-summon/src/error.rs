//! Error types for the summon simulator.

use thiserror::Error;

/// Result type for summon operations.
pub type SummonResult<T> = Result<T, SummonError>;

/// Errors that can occur while summoning.
#[derive(Debug, Error)]
pub enum SummonError {
    /// No bucket with a positive weight has any entity in it.
    #[error("no summonable entities for the current rates")]
    EmptyPool,

    /// The rate table could not be turned into a distribution.
    #[error("invalid rate weights: {0}")]
    InvalidWeights(String),

    /// No showcase matches the requested name.
    #[error("unknown showcase: {0}")]
    UnknownShowcase(String),

    /// Not a summon command.
    #[error("unknown summon command: {0}")]
    UnknownCommand(String),

    /// The showcase name index could not be built.
    #[error(transparent)]
    Query(#[from] notte_query::QueryError),
}

impl SummonError {
    /// Text shown to the user who triggered the error.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownShowcase(_) => {
                "I don't know that showcase! Use `showcase list` to see the list of showcases."
                    .to_string()
            }
            Self::EmptyPool => {
                "There's nothing to summon on this showcase right now.".to_string()
            }
            other => format!("Summon failed: {other}"),
        }
    }
}
