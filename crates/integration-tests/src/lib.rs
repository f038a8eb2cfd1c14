//! Integration tests for Kiosk.
//!
//! The backend REST API is replaced by a `wiremock` server; the storefront
//! and back-office clients run unmodified against it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kiosk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_identity` - Cart scoping by customer or anonymous session
//! - `cart_fail_soft` - Cart behaviour when the backend misbehaves
//! - `account` - Login, logout and profile flows
//! - `checkout_flow` - Placing orders
//! - `admin_backoffice` - Dashboard, CRUD and settings
//! - `persistence` - File-backed state across tabs and restarts

use std::sync::Arc;

use kiosk_core::Identity;
use kiosk_storefront::identity::IdentityProvider;
use kiosk_storefront::storage::{KeyValueStore, MemoryStore, keys};
use kiosk_storefront::{Storefront, StorefrontConfig};
use serde_json::{Value, json};
use wiremock::MockServer;

/// A mocked backend plus a storefront wired to it over in-memory storage.
pub struct TestContext {
    pub server: MockServer,
    pub durable: Arc<MemoryStore>,
    pub tab: Arc<MemoryStore>,
    pub storefront: Storefront,
}

impl TestContext {
    /// A first-time anonymous visitor: no token, no session.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built against the mock server.
    pub async fn new() -> Self {
        Self::with_durable(MemoryStore::new()).await
    }

    /// A visitor already logged in as `customer_id`.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built against the mock server.
    pub async fn logged_in(customer_id: i64) -> Self {
        let customer = customer_json(customer_id).to_string();
        Self::with_durable(MemoryStore::with_entries([
            (keys::TOKEN, "customer-jwt"),
            (keys::CUSTOMER, customer.as_str()),
        ]))
        .await
    }

    async fn with_durable(durable: MemoryStore) -> Self {
        let server = MockServer::start().await;
        let durable = Arc::new(durable);
        let tab = Arc::new(MemoryStore::new());
        let storefront = build_storefront(&server, durable.clone(), tab.clone());
        Self {
            server,
            durable,
            tab,
            storefront,
        }
    }

    /// A second tab of the same browser: shared durable storage, fresh tab
    /// storage.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot be built against the mock server.
    pub fn new_tab(&self) -> (Arc<MemoryStore>, Storefront) {
        let tab = Arc::new(MemoryStore::new());
        let storefront = build_storefront(&self.server, self.durable.clone(), tab.clone());
        (tab, storefront)
    }

    /// The session id persisted in this tab, if one was created.
    pub fn stored_session_id(&self) -> Option<String> {
        self.tab.get(keys::SESSION_ID)
    }

    /// The identity the next cart request will be scoped by.
    pub fn identity(&self) -> Identity {
        self.storefront.identity().resolve()
    }

    /// Query pairs of every request the mock server has received for `path`.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled on the mock server.
    pub async fn queries_for(&self, request_path: &str) -> Vec<Vec<(String, String)>> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .map(|r| r.url.query_pairs().into_owned().collect())
            .collect()
    }

    /// JSON bodies of every request the mock server has received for `path`.
    ///
    /// # Panics
    ///
    /// Panics if request recording is disabled or a body is not JSON.
    pub async fn bodies_for(&self, request_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .expect("request recording is enabled")
            .into_iter()
            .filter(|r| r.url.path() == request_path)
            .map(|r| r.body_json::<Value>().expect("request body is JSON"))
            .collect()
    }
}

fn build_storefront(
    server: &MockServer,
    durable: Arc<dyn KeyValueStore>,
    tab: Arc<dyn KeyValueStore>,
) -> Storefront {
    let config = StorefrontConfig {
        api_base_url: server.uri(),
        ..StorefrontConfig::default()
    };
    Storefront::with_stores(config, durable, tab).expect("mock server URI is a valid base URL")
}

/// Names of the cart scope parameters present in one request's query.
#[must_use]
pub fn scope_params(query: &[(String, String)]) -> Vec<&str> {
    query
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| *name == Identity::CUSTOMER_PARAM || *name == Identity::SESSION_PARAM)
        .collect()
}

/// A customer record as the backend returns it.
#[must_use]
pub fn customer_json(id: i64) -> Value {
    json!({
        "id": id,
        "email": format!("customer{id}@example.com"),
        "username": format!("customer{id}"),
        "name": "Jane Doe",
        "phone": "555-0100",
        "address": "1 Main St",
        "city": "Springfield",
        "country": "US",
        "is_active": true,
        "is_verified": true
    })
}

/// One cart item: `(item_id, product_id, name, unit_price, quantity)`.
pub type ItemSpec<'a> = (i64, i64, &'a str, f64, i64);

/// A cart response with the given items.
#[must_use]
pub fn cart_json(items: &[ItemSpec<'_>]) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|&(item_id, product_id, name, price, quantity)| {
            json!({
                "id": item_id,
                "cart_id": 1,
                "product_id": product_id,
                "quantity": quantity,
                "price": price,
                "product": {
                    "id": product_id,
                    "name": name,
                    "price": price,
                    "thumbnail": null,
                    "image_url": null
                }
            })
        })
        .collect();
    json!({
        "id": if items.is_empty() { 0 } else { 1 },
        "customer_id": null,
        "session_id": null,
        "items": items,
        "total_amount": 0
    })
}
