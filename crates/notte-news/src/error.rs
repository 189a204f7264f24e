//! Errors raised while fetching or decoding the news feed.

/// Alias for `Result<T, NewsError>`.
pub type NewsResult<T> = Result<T, NewsError>;

/// Errors that can occur while fetching news.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    /// The request could not be sent, or the server answered with an error
    /// status.
    #[error("news request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not the expected JSON.
    #[error("malformed news response: {0}")]
    Json(#[from] serde_json::Error),

    /// The API reported a failed query.
    #[error("news API returned result code {code}")]
    ResultCode {
        /// The reported code; `1` means success.
        code: i64,
    },

    /// The API reported success but sent no data.
    #[error("news response has no data")]
    MissingData,
}
