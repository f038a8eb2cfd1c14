//! Back-office error type.

use kiosk_core::EmailError;
use kiosk_core::client::ApiError;
use thiserror::Error;

/// Errors from back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No admin token is held; log in first.
    #[error("Not logged in as an administrator")]
    NotAuthenticated,

    /// Login email is malformed.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl AdminError {
    /// Whether re-authenticating could fix the error.
    #[must_use]
    pub const fn needs_login(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::Api(ApiError::Unauthorized(_))
        )
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_login() {
        assert!(AdminError::NotAuthenticated.needs_login());
        assert!(AdminError::Api(ApiError::Unauthorized("Not an admin account".into())).needs_login());
        assert!(!AdminError::Api(ApiError::NotFound("Order not found".into())).needs_login());
    }

    #[test]
    fn test_display() {
        let err = AdminError::Api(ApiError::NotFound("Order not found".into()));
        assert_eq!(err.to_string(), "Not found: Order not found");
    }
}
