//! Shared REST client (feature `client`).
//!
//! Both the storefront and the back office consume the same backend over
//! plain JSON/HTTP. This module holds the transport and error mapping they
//! share; the endpoint-specific code lives in the respective crates.

mod error;
mod rest;

pub use error::ApiError;
pub use rest::{Call, RestClient};

pub use reqwest::Method;
pub use secrecy::{ExposeSecret, SecretString};
