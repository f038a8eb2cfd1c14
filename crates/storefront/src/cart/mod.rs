//! Cart accessor.
//!
//! Reads and mutates the visitor's server-side cart, scoped by whichever
//! identity the [`IdentityProvider`] resolves. The server is the only source
//! of truth: lines are never merged or adjusted locally.
//!
//! Every operation is fail-soft. Instead of an error the caller gets a
//! [`CartState::Degraded`] carrying the best lines available and the cause.

mod wire;

use std::sync::Arc;

use kiosk_core::client::{ApiError, RestClient};
use kiosk_core::{CartItemId, CartLine, Identity, Price, ProductId, Quantity};
use tracing::{debug, instrument, warn};

pub use wire::{
    AddToCartRequest, CartItemResponse, CartProductResponse, CartResponse, UpdateCartItemRequest,
};

use crate::error::add_breadcrumb;
use crate::identity::IdentityProvider;

/// Outcome of a cart operation.
#[derive(Debug)]
pub enum CartState {
    /// The server returned a cart with at least one line.
    Loaded(Vec<CartLine>),
    /// The server confirmed the cart is empty.
    Empty,
    /// The request failed. `lines` is the fallback to display, possibly empty.
    Degraded { lines: Vec<CartLine>, cause: ApiError },
}

impl CartState {
    fn from_lines(lines: Vec<CartLine>) -> Self {
        if lines.is_empty() {
            Self::Empty
        } else {
            Self::Loaded(lines)
        }
    }

    /// Lines to display, whatever happened.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        match self {
            Self::Loaded(lines) | Self::Degraded { lines, .. } => lines,
            Self::Empty => &[],
        }
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        match self {
            Self::Loaded(lines) | Self::Degraded { lines, .. } => lines,
            Self::Empty => Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Why the operation degraded, if it did.
    #[must_use]
    pub const fn cause(&self) -> Option<&ApiError> {
        match self {
            Self::Degraded { cause, .. } => Some(cause),
            Self::Loaded(_) | Self::Empty => None,
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines()
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines().iter().map(CartLine::line_total).sum()
    }
}

/// Client for the cart endpoints.
#[derive(Clone)]
pub struct CartClient {
    rest: RestClient,
    identity: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for CartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartClient")
            .field("rest", &self.rest)
            .finish_non_exhaustive()
    }
}

impl CartClient {
    #[must_use]
    pub fn new(rest: RestClient, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { rest, identity }
    }

    /// Fetch the current cart.
    ///
    /// Failures yield [`CartState::Degraded`] with no lines.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> CartState {
        let identity = self.identity.resolve();
        match self.fetch_cart(&identity).await {
            Ok(lines) => CartState::from_lines(lines),
            Err(cause) => {
                warn!(error = %cause, %identity, "Failed to fetch cart; showing it as empty");
                CartState::Degraded {
                    lines: Vec::new(),
                    cause,
                }
            }
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// The server merges repeated adds of the same product into one line. On
    /// failure the cart is re-read and returned as [`CartState::Degraded`].
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: Quantity) -> CartState {
        let identity = self.identity.resolve();
        let body = AddToCartRequest::new(product_id, quantity, &identity);

        let result = self
            .rest
            .post(&["cart", "add"])
            .json(&body)
            .fetch::<CartResponse>()
            .await;

        match result {
            Ok(cart) => {
                debug!(%identity, "Added to cart");
                let product = product_id.to_string();
                add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.as_str())]));
                CartState::from_lines(cart.into_lines())
            }
            Err(cause) => {
                warn!(error = %cause, %identity, "Failed to add to cart");
                self.degrade_with_refetch(cause).await
            }
        }
    }

    /// Add a single unit of a product.
    pub async fn add_one(&self, product_id: ProductId) -> CartState {
        self.add_to_cart(product_id, Quantity::ONE).await
    }

    /// Change the quantity of a product in the cart.
    ///
    /// Quantity changes are not sent to the server; this returns the current
    /// cart unchanged. Use [`Self::set_line_quantity`] to change a line.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) -> CartState {
        debug!("Quantity update is not forwarded to the server");
        self.get_cart().await
    }

    /// Remove a product from the cart.
    ///
    /// Removals are not sent to the server; this returns the current cart
    /// unchanged. Use [`Self::remove_line`] to remove a line.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, product_id: ProductId) -> CartState {
        debug!("Removal is not forwarded to the server");
        self.get_cart().await
    }

    /// Empty the cart.
    ///
    /// The result never has lines, even when the server call fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> CartState {
        let identity = self.identity.resolve();
        let (name, value) = identity.scope_param();

        match self
            .rest
            .delete(&["cart", "clear"])
            .query(name, value)
            .send()
            .await
        {
            Ok(()) => {
                debug!(%identity, "Cleared cart");
                CartState::Empty
            }
            Err(cause) => {
                warn!(error = %cause, %identity, "Failed to clear cart; ignoring");
                CartState::Degraded {
                    lines: Vec::new(),
                    cause,
                }
            }
        }
    }

    /// Set the quantity of one cart line. Zero removes the line.
    #[instrument(skip(self))]
    pub async fn set_line_quantity(&self, item_id: CartItemId, quantity: u32) -> CartState {
        let identity = self.identity.resolve();
        let (name, value) = identity.scope_param();
        let id = item_id.to_string();

        let result = self
            .rest
            .put(&["cart", "item", &id])
            .query(name, value)
            .json(&UpdateCartItemRequest { quantity })
            .send()
            .await;

        self.refresh_after(result).await
    }

    /// Remove one cart line.
    #[instrument(skip(self))]
    pub async fn remove_line(&self, item_id: CartItemId) -> CartState {
        let identity = self.identity.resolve();
        let (name, value) = identity.scope_param();
        let id = item_id.to_string();

        let result = self
            .rest
            .delete(&["cart", "item", &id])
            .query(name, value)
            .send()
            .await;

        self.refresh_after(result).await
    }

    async fn fetch_cart(&self, identity: &Identity) -> Result<Vec<CartLine>, ApiError> {
        let (name, value) = identity.scope_param();
        let cart: CartResponse = self.rest.get(&["cart"]).query(name, value).fetch().await?;
        Ok(cart.into_lines())
    }

    async fn refresh_after(&self, mutation: Result<(), ApiError>) -> CartState {
        match mutation {
            Ok(()) => self.get_cart().await,
            Err(cause) => {
                warn!(error = %cause, "Cart line update failed");
                self.degrade_with_refetch(cause).await
            }
        }
    }

    async fn degrade_with_refetch(&self, cause: ApiError) -> CartState {
        let lines = self.get_cart().await.into_lines();
        CartState::Degraded { lines, cause }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kiosk_core::{CustomerId, SessionId};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct Fixed(Identity);

    impl IdentityProvider for Fixed {
        fn resolve(&self) -> Identity {
            self.0.clone()
        }
    }

    fn session() -> Identity {
        Identity::AnonymousSession(SessionId::new("session_test1").unwrap())
    }

    fn client(server: &MockServer, identity: Identity) -> CartClient {
        CartClient::new(
            RestClient::new(&server.uri(), None).unwrap(),
            Arc::new(Fixed(identity)),
        )
    }

    fn cart_json(quantity: i64) -> serde_json::Value {
        json!({
            "id": 1,
            "session_id": "session_test1",
            "items": [{
                "id": 10, "cart_id": 1, "product_id": 7, "quantity": quantity, "price": 12.5,
                "product": {"id": 7, "name": "Lamp", "price": 12.5}
            }],
            "total_amount": 12.5
        })
    }

    #[tokio::test]
    async fn test_get_cart_scopes_by_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .and(query_param("session_id", "session_test1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(2)))
            .expect(1)
            .mount(&server)
            .await;

        let state = client(&server, session()).get_cart().await;
        assert!(matches!(state, CartState::Loaded(_)));
        assert_eq!(state.item_count(), 2);
        assert_eq!(state.subtotal(), Price::from_units(25));
    }

    #[tokio::test]
    async fn test_get_cart_failure_is_degraded_and_empty() {
        let server = MockServer::start().await;
        Mock::given(path("/cart"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let state = client(&server, session()).get_cart().await;
        assert!(state.is_degraded());
        assert!(state.lines().is_empty());
        assert_eq!(state.cause().and_then(ApiError::status), Some(500));
    }

    #[tokio::test]
    async fn test_add_to_cart_posts_customer_and_null_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cart/add"))
            .and(body_json(json!({
                "product_id": 7, "quantity": 3, "customer_id": 42, "session_id": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(3)))
            .expect(1)
            .mount(&server)
            .await;

        let state = client(&server, Identity::Customer(CustomerId::new(42)))
            .add_to_cart(ProductId::new(7), Quantity::new(3).unwrap())
            .await;
        assert_eq!(state.item_count(), 3);
    }

    #[tokio::test]
    async fn test_add_failure_falls_back_to_current_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cart/add"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Product not found"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(1)))
            .expect(1)
            .mount(&server)
            .await;

        let state = client(&server, session()).add_one(ProductId::new(99)).await;
        assert!(matches!(state.cause(), Some(ApiError::NotFound(_))));
        assert_eq!(state.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_remove_do_not_mutate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(2)))
            .expect(2)
            .mount(&server)
            .await;

        let cart = client(&server, session());
        assert_eq!(cart.update_quantity(ProductId::new(7), 5).await.item_count(), 2);
        assert_eq!(cart.remove_from_cart(ProductId::new(7)).await.item_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_cart_is_empty_even_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cart/clear"))
            .and(query_param("session_id", "session_test1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let state = client(&server, session()).clear_cart().await;
        assert!(state.is_degraded());
        assert!(state.lines().is_empty());
    }

    #[tokio::test]
    async fn test_set_line_quantity_puts_then_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cart/item/10"))
            .and(query_param("customer_id", "42"))
            .and(body_json(json!({"quantity": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(4)))
            .mount(&server)
            .await;

        let state = client(&server, Identity::Customer(CustomerId::new(42)))
            .set_line_quantity(CartItemId::new(10), 4)
            .await;
        assert_eq!(state.item_count(), 4);
    }

    #[tokio::test]
    async fn test_remove_line_deletes_item() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cart/item/10"))
            .and(query_param("session_id", "session_test1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1, "items": [], "total_amount": 0})),
            )
            .mount(&server)
            .await;

        let state = client(&server, session()).remove_line(CartItemId::new(10)).await;
        assert!(matches!(state, CartState::Empty));
    }
}
