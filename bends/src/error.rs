use thiserror::Error;

/// Errors raised by the HTTP collaborators.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure or non-success status
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with an error-shaped body
    #[error("API error: {0}")]
    Api(String),

    /// Body could not be decoded into the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}
