//! Error types for query indexing.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that can occur while building or populating a query index.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A key was added with an empty payload.
    #[error("payload for query key \"{0}\" is empty")]
    InvalidPayload(String),

    /// Entity data could not be loaded for an index build.
    #[error(transparent)]
    Data(#[from] notte_core::CoreError),
}
