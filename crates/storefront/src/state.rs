//! Storefront handle shared by front ends.

use std::sync::Arc;

use kiosk_core::client::{ApiError, RestClient};

use crate::auth::AuthClient;
use crate::cart::CartClient;
use crate::catalog::CatalogClient;
use crate::checkout::CheckoutClient;
use crate::config::StorefrontConfig;
use crate::identity::IdentityResolver;
use crate::storage::{FileStore, KeyValueStore};

/// All storefront clients wired to one identity resolver.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    identity: Arc<IdentityResolver>,
    catalog: CatalogClient,
    cart: CartClient,
    auth: AuthClient,
    checkout: CheckoutClient,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api_base_url", &self.inner.config.api_base_url)
            .field("tab", &self.inner.config.tab)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Create a storefront whose state lives in files under
    /// `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is unusable.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let durable: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.durable_store_path()));
        let tab: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.tab_store_path()));
        Self::with_stores(config, durable, tab)
    }

    /// Create a storefront over caller-supplied stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is unusable.
    pub fn with_stores(
        config: StorefrontConfig,
        durable: Arc<dyn KeyValueStore>,
        tab: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let rest = RestClient::new(&config.api_base_url, config.http_timeout)?;
        let identity = Arc::new(IdentityResolver::new(durable, tab));

        let catalog = CatalogClient::new(rest.clone());
        let cart = CartClient::new(rest.clone(), identity.clone());
        let auth = AuthClient::new(rest.clone(), identity.clone());
        let checkout = CheckoutClient::new(rest, cart.clone(), identity.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                identity,
                catalog,
                cart,
                auth,
                checkout,
            }),
        })
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the identity resolver.
    #[must_use]
    pub fn identity(&self) -> &IdentityResolver {
        &self.inner.identity
    }

    /// Get the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get the cart client.
    #[must_use]
    pub fn cart(&self) -> &CartClient {
        &self.inner.cart
    }

    /// Get the account client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Get the checkout client.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutClient {
        &self.inner.checkout
    }
}
