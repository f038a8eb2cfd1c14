//! Kiosk storefront client library.
//!
//! Customer-facing access to the backend REST API: catalog browsing, the
//! server-side cart, customer accounts and checkout. Visitor identity (a
//! logged-in customer or an anonymous per-tab session) is resolved from
//! injected client-side storage.
//!
//! ```rust,ignore
//! let storefront = Storefront::new(StorefrontConfig::from_env()?)?;
//! let cart = storefront.cart().add_one(ProductId::new(7)).await;
//! println!("{} items, {}", cart.item_count(), cart.subtotal());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod identity;
pub mod state;
pub mod storage;

pub use cart::{CartClient, CartState};
pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use identity::{IdentityProvider, IdentityResolver};
pub use state::Storefront;
