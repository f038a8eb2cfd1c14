//! REST API errors.

use thiserror::Error;

/// Errors that can occur when talking to the backend REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the credentials, or none were available.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("API returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, or a body excerpt.
        detail: String,
    },

    /// The response body did not match the expected shape.
    #[error("JSON parse error for {context}: {source}")]
    Parse {
        /// Request the body belonged to (e.g. `GET /cart`).
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The configured base URL cannot be used to build request URLs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status associated with the error, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Parse { .. } | Self::Encode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Whether the failure happened before a response arrived.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
