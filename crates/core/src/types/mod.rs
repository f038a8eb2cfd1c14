//! Core types for Kiosk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod identity;
pub mod order;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;

pub use cart::{CartLine, ProductSummary};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{CustomerRecord, Identity, SessionId};
pub use order::{Order, OrderInput};
pub use price::Price;
pub use product::{Category, Product};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
