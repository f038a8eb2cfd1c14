//! Kiosk Core - Shared types library.
//!
//! This crate provides common types used across all Kiosk components:
//! - `storefront` - Customer-facing client (catalog, cart, checkout, account)
//! - `admin` - Back-office client (dashboard, CRUD over store data)
//! - `cli` - Command-line front end for both
//!
//! # Architecture
//!
//! By default the core crate contains only types - no I/O, no storage, no
//! HTTP. The optional `client` feature adds [`client::RestClient`], the
//! JSON-over-HTTP plumbing shared by the storefront and admin crates.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities, emails, visitor
//!   identity and cart lines
//! - [`client`] - Shared REST client (feature `client`)

#![cfg_attr(not(test), forbid(unsafe_code))]

#[cfg(feature = "client")]
pub mod client;
pub mod types;

pub use types::*;
