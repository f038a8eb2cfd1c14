//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` for front ends that drive several
//! storefront clients, plus helpers that attach user context and breadcrumbs
//! to Sentry reports. Without an initialised Sentry client the helpers are
//! no-ops.

use kiosk_core::client::ApiError;
use thiserror::Error;

use crate::auth::AuthError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Client-side storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl StorefrontError {
    /// Whether this error points at a fault outside the user's control.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(err) | Self::Auth(AuthError::Api(err)) => is_server_api_fault(err),
            Self::Storage(_) | Self::Auth(AuthError::Storage(_)) => true,
            Self::Checkout(CheckoutError::OrderFailed(_)) => true,
            Self::Config(_)
            | Self::Auth(AuthError::InvalidEmail(_))
            | Self::Checkout(_)
            | Self::BadRequest(_) => false,
        }
    }

    /// Text suitable for showing to the user. Server faults get a generic
    /// message; details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Checkout(err) => err.user_message(),
            Self::Auth(AuthError::InvalidEmail(_)) => {
                "Please enter a valid email address.".to_string()
            }
            Self::Api(err) | Self::Auth(AuthError::Api(err)) => match err {
                ApiError::Unauthorized(detail) | ApiError::NotFound(detail) => detail.clone(),
                ApiError::Status { status, detail } if *status < 500 => detail.clone(),
                _ => "Something went wrong. Please try again.".to_string(),
            },
            Self::Storage(_) | Self::Auth(AuthError::Storage(_)) => {
                "Could not save local state.".to_string()
            }
            Self::Config(_) | Self::BadRequest(_) => self.to_string(),
        }
    }

    /// Log the error, capturing server faults to Sentry.
    pub fn report(&self) {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront request rejected");
        }
    }
}

const fn is_server_api_fault(err: &ApiError) -> bool {
    match err {
        ApiError::Status { status, .. } => *status >= 500,
        ApiError::Unauthorized(_) | ApiError::NotFound(_) => false,
        ApiError::Http(_) | ApiError::Parse { .. } | ApiError::Encode(_) | ApiError::InvalidUrl(_) => {
            true
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
