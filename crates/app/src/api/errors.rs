//! Backend API Errors

use thiserror::Error;

/// Errors that can occur when talking to the store backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be used.
    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(String),

    /// The resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The backend refused the request (409 or 422).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The backend returned any other non-2xx status.
    #[error("unexpected response with status {status}: {body}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
