//! Flat cart line types for display.
//!
//! The backend nests a product summary inside each cart item; clients flatten
//! that into [`CartLine`]s. The server guarantees at most one line per
//! product, so lines are never merged client-side.

use serde::{Deserialize, Serialize};

use crate::types::id::{CartItemId, ProductId};
use crate::types::price::Price;
use crate::types::quantity::Quantity;

/// The product fields a cart needs to render a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductSummary {
    /// Best image reference for a small rendering, thumbnail first.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.thumbnail.as_deref().or(self.image_url.as_deref())
    }
}

/// One product and its quantity within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Server-side cart item id, used by line-level mutations.
    pub item_id: CartItemId,
    pub product: ProductSummary,
    pub quantity: Quantity,
}

impl CartLine {
    /// Price of the line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price_cents: i64, quantity: u32) -> CartLine {
        CartLine {
            item_id: CartItemId::new(1),
            product: ProductSummary {
                id: ProductId::new(7),
                name: "Desk Lamp".to_string(),
                price: Price::from_cents(price_cents),
                thumbnail: None,
                image_url: Some("https://cdn.example.com/lamp.jpg".to_string()),
            },
            quantity: Quantity::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(2500, 4).line_total(), Price::from_units(100));
    }

    #[test]
    fn test_image_falls_back_to_full_size() {
        let line = line(100, 1);
        assert_eq!(line.product.image(), Some("https://cdn.example.com/lamp.jpg"));
    }
}
