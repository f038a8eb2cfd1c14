//! Subcommand implementations.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;

use kiosk_admin::AdminError;
use kiosk_core::client::ApiError;
use kiosk_storefront::StorefrontError;
use kiosk_storefront::auth::AuthError;
use kiosk_storefront::cart::CartState;
use kiosk_storefront::checkout::CheckoutError;
use kiosk_storefront::storage::StorageError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error("Back office: {0}")]
    Admin(#[from] AdminError),

    #[error("Back-office configuration error: {0}")]
    AdminConfig(#[from] kiosk_admin::config::ConfigError),

    /// Arguments that parse but make no sense together.
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Text for the terminal. Details of server faults stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Storefront(err) => err.user_message(),
            Self::Admin(err) if err.needs_login() => {
                "Not logged in as an administrator. Run `kiosk admin login` or set KIOSK_ADMIN_TOKEN."
                    .to_string()
            }
            Self::Admin(_) | Self::AdminConfig(_) | Self::Usage(_) => self.to_string(),
        }
    }

    /// Log the error; storefront server faults also go to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(err) => err.report(),
            Self::Admin(err) if err.needs_login() => {
                tracing::warn!(error = %err, "Back-office command refused");
            }
            Self::Admin(err) => {
                let event_id = sentry::capture_error(err);
                tracing::error!(error = %err, sentry_event_id = %event_id, "Back-office command failed");
            }
            Self::AdminConfig(_) | Self::Usage(_) => {}
        }
    }
}

macro_rules! via_storefront {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(err: $source) -> Self {
                    Self::Storefront(err.into())
                }
            }
        )+
    };
}

via_storefront!(
    ApiError,
    AuthError,
    CheckoutError,
    StorageError,
    kiosk_storefront::config::ConfigError,
);

/// Print a cart the way every cart command shows it.
#[allow(clippy::print_stdout)]
pub fn print_cart(cart: &CartState) {
    if let Some(cause) = cart.cause() {
        tracing::debug!(error = %cause, "Showing degraded cart");
        println!("(cart could not be refreshed; showing what is known)");
    }
    if cart.lines().is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for line in cart.lines() {
        println!(
            "  [{:>4}] {:<36} {:>3} x {:>9} = {:>10}",
            line.item_id.get(),
            line.product.name,
            line.quantity.get(),
            line.product.price.to_string(),
            line.line_total().to_string(),
        );
    }
    println!("{} item(s), subtotal {}", cart.item_count(), cart.subtotal());
}
