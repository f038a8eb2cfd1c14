//! Cart payloads as the backend sends and expects them.

use kiosk_core::{
    CartId, CartItemId, CartLine, CustomerId, Identity, Price, ProductId, ProductSummary,
    Quantity,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// `GET /cart` and `POST /cart/add` response.
///
/// A visitor without a cart gets `id: 0` and no items.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItemResponse>,
    #[serde(default)]
    pub total_amount: Price,
}

/// One item inside a [`CartResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemResponse {
    pub id: CartItemId,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Unit price charged for this item.
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub product: Option<CartProductResponse>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Product summary nested in a cart item.
#[derive(Debug, Clone, Deserialize)]
pub struct CartProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CartResponse {
    /// Flatten nested items into display lines.
    ///
    /// Items whose product has been deleted, or whose quantity is not
    /// positive, cannot be displayed and are dropped with a warning.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.items
            .into_iter()
            .filter_map(CartItemResponse::into_line)
            .collect()
    }
}

impl CartItemResponse {
    fn into_line(self) -> Option<CartLine> {
        let Some(product) = self.product else {
            warn!(item_id = %self.id, product_id = %self.product_id, "Cart item has no product; skipping");
            return None;
        };
        let quantity = u32::try_from(self.quantity)
            .ok()
            .and_then(|q| Quantity::new(q).ok());
        let Some(quantity) = quantity else {
            warn!(item_id = %self.id, quantity = self.quantity, "Cart item has invalid quantity; skipping");
            return None;
        };

        Some(CartLine {
            item_id: self.id,
            product: ProductSummary {
                id: product.id,
                name: product.name,
                // The item price is what the server charges; the nested
                // product price may have changed since the item was added.
                price: self.price.unwrap_or(product.price),
                thumbnail: product.thumbnail,
                image_url: product.image_url,
            },
            quantity,
        })
    }
}

/// `POST /cart/add` body.
///
/// Exactly one of `customer_id` / `session_id` is set; the other is sent as
/// an explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub customer_id: Option<CustomerId>,
    pub session_id: Option<String>,
}

impl AddToCartRequest {
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Quantity, identity: &Identity) -> Self {
        Self {
            product_id,
            quantity,
            customer_id: identity.customer_id(),
            session_id: identity.session_id().map(|s| s.as_str().to_owned()),
        }
    }
}

/// `PUT /cart/item/{id}` body. A quantity of zero removes the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kiosk_core::SessionId;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_normalizes_nested_items() {
        let cart: CartResponse = serde_json::from_value(json!({
            "id": 3,
            "customer_id": null,
            "session_id": "session_abc",
            "items": [{
                "id": 11,
                "cart_id": 3,
                "product_id": 7,
                "quantity": 2,
                "price": 19.5,
                "product": {"id": 7, "name": "Kettle", "price": 21.0, "thumbnail": "k.jpg", "image_url": null},
                "created_at": "2024-05-01T10:00:00"
            }],
            "total_amount": 39.0
        }))
        .unwrap();

        let lines = cart.into_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id, CartItemId::new(11));
        assert_eq!(lines[0].product.name, "Kettle");
        assert_eq!(lines[0].product.price, Price::from_cents(1950));
        assert_eq!(lines[0].quantity.get(), 2);
        assert_eq!(lines[0].product.image(), Some("k.jpg"));
    }

    #[test]
    fn test_missing_cart_is_empty() {
        let cart: CartResponse =
            serde_json::from_value(json!({"id": 0, "items": [], "total_amount": 0})).unwrap();
        assert!(cart.into_lines().is_empty());
    }

    #[test]
    fn test_skips_orphaned_and_zero_quantity_items() {
        let cart: CartResponse = serde_json::from_value(json!({
            "id": 1,
            "items": [
                {"id": 1, "product_id": 1, "quantity": 1, "product": null},
                {"id": 2, "product_id": 2, "quantity": 0, "product": {"id": 2, "name": "B", "price": 1.0}},
                {"id": 3, "product_id": 3, "quantity": 4, "product": {"id": 3, "name": "C", "price": 2.5}}
            ]
        }))
        .unwrap();
        let lines = cart.into_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.id, ProductId::new(3));
        assert_eq!(lines[0].product.price, Price::from_cents(250));
    }

    #[test]
    fn test_add_request_serializes_other_id_as_null() {
        let customer = Identity::Customer(CustomerId::new(42));
        let body = AddToCartRequest::new(ProductId::new(7), Quantity::new(3).unwrap(), &customer);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"product_id": 7, "quantity": 3, "customer_id": 42, "session_id": null})
        );

        let session = Identity::AnonymousSession(SessionId::new("session_x").unwrap());
        let body = AddToCartRequest::new(ProductId::new(7), Quantity::ONE, &session);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"product_id": 7, "quantity": 1, "customer_id": null, "session_id": "session_x"})
        );
    }
}
