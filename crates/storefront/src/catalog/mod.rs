//! Product catalog client.
//!
//! Read-only access to products and categories. Responses are cached in
//! memory for 5 minutes; cart state is never cached.

mod cache;

use std::time::Duration;

use kiosk_core::client::{ApiError, RestClient};
use kiosk_core::{CategoryId, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};
use url::Url;

use cache::{CacheKey, CacheValue};
pub use kiosk_core::{Category, Product};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for the product and category endpoints.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct CatalogClient {
    rest: RestClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("rest", &self.rest)
            .field("cached_entries", &self.cache.entry_count())
            .finish()
    }
}

impl CatalogClient {
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { rest, cache }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products, optionally restricted to a category name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, category: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::Products {
            category: category.map(str::to_owned),
        };
        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .rest
            .get(&["products"])
            .query_opt("category", category)
            .fetch()
            .await?;

        self.cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let segment = id.to_string();
        let product: Product = self.rest.get(&["products", &segment]).fetch().await?;

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.rest.get(&["categories"]).fetch().await?;

        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or another error if
    /// the API request fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn category(&self, id: CategoryId) -> Result<Category, ApiError> {
        let key = CacheKey::Category(id);
        if let Some(CacheValue::Category(category)) = self.cache.get(&key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let segment = id.to_string();
        let category: Category = self.rest.get(&["categories", &segment]).fetch().await?;

        self.cache
            .insert(key, CacheValue::Category(Box::new(category.clone())))
            .await;
        Ok(category)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// URL that fetches `image_url` through the backend's image proxy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL cannot carry a path.
    pub fn proxy_image_url(&self, image_url: &str) -> Result<Url, ApiError> {
        self.rest
            .url(&["proxy-image"], &[("url", image_url.to_owned())])
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn catalog(server: &MockServer) -> CatalogClient {
        CatalogClient::new(RestClient::new(&server.uri(), None).unwrap())
    }

    #[tokio::test]
    async fn test_products_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("category", "Kitchen"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1, "name": "Kettle", "price": 30}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let catalog = catalog(&server);
        let first = catalog.products(Some("Kitchen")).await.unwrap();
        let second = catalog.products(Some("Kitchen")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "Kettle");
    }

    #[tokio::test]
    async fn test_invalidate_all_refetches() {
        let server = MockServer::start().await;
        Mock::given(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"id": 2, "name": "Laundry"}])),
            )
            .expect(2)
            .mount(&server)
            .await;

        let catalog = catalog(&server);
        catalog.categories().await.unwrap();
        catalog.invalidate_all().await;
        let categories = catalog.categories().await.unwrap();
        assert_eq!(categories[0].id, CategoryId::new(2));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(path("/products/404"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Product not found"})),
            )
            .mount(&server)
            .await;

        let err = catalog(&server)
            .product(ProductId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_proxy_image_url_encodes_target() {
        let rest = RestClient::new("http://localhost:8000", None).unwrap();
        let url = CatalogClient::new(rest)
            .proxy_image_url("https://img.example.com/a.jpg?w=800")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/proxy-image?url=https%3A%2F%2Fimg.example.com%2Fa.jpg%3Fw%3D800"
        );
    }
}
