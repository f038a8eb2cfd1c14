//! Kiosk back-office library.
//!
//! Administrator access to the backend REST API: login, the dashboard
//! summary, CRUD over products, orders, categories and customers, and store
//! settings.
//!
//! # Security
//!
//! The admin token grants write access to the whole store. It is held in
//! memory only and never written to logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod resources;
pub mod types;

pub use client::AdminClient;
pub use config::AdminConfig;
pub use dashboard::{DashboardStats, DashboardSummary};
pub use error::AdminError;
pub use resources::{Categories, Customers, Orders, Products, Resource};
