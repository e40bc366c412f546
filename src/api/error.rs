/// Error types for the compose API client
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// The API reported a failure in its response body
    #[error("API error: {0}")]
    Api(String),
}
