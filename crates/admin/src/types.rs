//! Back-office records and form inputs.
//!
//! Products, categories, orders and customers are the shared `kiosk_core`
//! records; the types here cover what only the back office sees.

use kiosk_core::{AdminId, Price};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub use kiosk_core::{Category, Product};

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Admin {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// Successful admin login response.
#[derive(Clone, Deserialize)]
#[serde(from = "AdminTokenWire")]
pub struct AdminToken {
    pub access_token: SecretString,
    pub token_type: String,
    pub admin: Admin,
}

#[derive(Deserialize)]
struct AdminTokenWire {
    access_token: String,
    token_type: String,
    admin: Admin,
}

impl From<AdminTokenWire> for AdminToken {
    fn from(wire: AdminTokenWire) -> Self {
        Self {
            access_token: SecretString::from(wire.access_token),
            token_type: wire.token_type,
            admin: wire.admin,
        }
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("admin", &self.admin)
            .finish()
    }
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: i64,
    pub category: Option<String>,
    pub sku: Option<String>,
    pub is_active: bool,
}

impl ProductInput {
    /// A new active product with no stock.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock: 0,
            category: None,
            sku: None,
            is_active: true,
        }
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            category: product.category.clone(),
            sku: product.sku.clone(),
            is_active: product.is_active,
        }
    }
}

/// Body for creating or replacing a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Body for creating or replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
}

impl From<&kiosk_core::CustomerRecord> for CustomerInput {
    fn from(customer: &kiosk_core::CustomerRecord) -> Self {
        Self {
            email: customer.email.clone(),
            username: customer
                .username
                .clone()
                .unwrap_or_else(|| customer.email.clone()),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            address: customer.address.clone(),
            city: customer.city.clone(),
            country: customer.country.clone(),
            is_active: customer.is_active,
            is_verified: customer.is_verified,
        }
    }
}
