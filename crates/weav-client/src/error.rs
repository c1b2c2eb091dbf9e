// Error type shared by all service operations
//
// Status codes are classified once, in the client wrapper: 401 is always an
// authentication failure, 422 a request-validation failure, 404 a missing
// resource. Anything else non-2xx is a generic API failure. There is no retry
// path; every error is terminal for the operation that produced it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("authentication failed: the service rejected the bearer token")]
    Unauthorized,

    #[error("validation failed, ensure data entered is correct")]
    Validation {
        /// Response body from the service, when it could be decoded.
        detail: Option<serde_json::Value>,
    },

    #[error("resource not found")]
    NotFound,

    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("event stream error: {0}")]
    EventStream(#[from] crate::sse::EventError),
}
