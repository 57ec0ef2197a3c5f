//! Error types for the Ontolens SDK.

use thiserror::Error;

/// SDK operation errors
#[derive(Debug, Error)]
pub enum SdkError {
    /// Connection error (network, DNS, refused, etc.)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The service answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The configured base URL is unusable
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other request failure
    #[error("Request error: {0}")]
    RequestError(String),
}

impl SdkError {
    /// Whether the service rejected the request because the resource is unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::ApiError { status: 404, .. })
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SdkError::Timeout
        } else if e.is_connect() {
            SdkError::ConnectionError(e.to_string())
        } else if e.is_decode() {
            SdkError::DecodeError(e.to_string())
        } else if e.is_status() {
            match e.status() {
                Some(status) => SdkError::ApiError {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => SdkError::RequestError(e.to_string()),
            }
        } else {
            SdkError::RequestError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::DecodeError(format!("JSON parsing error: {}", e))
    }
}
