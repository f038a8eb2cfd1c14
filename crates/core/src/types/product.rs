//! Product and category records, shared by the storefront catalog and the
//! back office.

use serde::{Deserialize, Serialize};

use crate::types::cart::ProductSummary;
use crate::types::id::{CategoryId, ProductId};
use crate::types::price::Price;

/// A product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub stock: i64,
    /// Category name (not id).
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Comma-separated image URLs.
    #[serde(default)]
    pub gallery: Option<String>,
    /// `|`-separated `Name: value` pairs.
    #[serde(default)]
    pub specifications: Option<String>,
    /// `|`-separated feature bullets.
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// The fields a cart line needs.
    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            thumbnail: self.thumbnail.clone(),
            image_url: self.image_url.clone(),
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Gallery image URLs, main image first when it is not already listed.
    #[must_use]
    pub fn images(&self) -> Vec<&str> {
        let mut images: Vec<&str> = split_list(self.gallery.as_deref(), ',').collect();
        if let Some(main) = self.image_url.as_deref()
            && !images.contains(&main)
        {
            images.insert(0, main);
        }
        images
    }

    #[must_use]
    pub fn feature_list(&self) -> Vec<&str> {
        split_list(self.features.as_deref(), '|').collect()
    }

    /// Specification rows as `(name, value)`. Rows without a `:` have an
    /// empty name.
    #[must_use]
    pub fn specification_rows(&self) -> Vec<(&str, &str)> {
        split_list(self.specifications.as_deref(), '|')
            .map(|row| match row.split_once(':') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => ("", row),
            })
            .collect()
    }
}

fn split_list(raw: Option<&str>, separator: char) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
