//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use awe_electronics_core::ProductId;

/// A catalogue product with its associated tags and image URLs.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Current sale price.
    pub price: Decimal,
    /// Physical on-hand inventory.
    pub stock: i32,
    /// Quantity still sellable; decremented when an order is placed.
    pub available: i32,
    /// Discontinued products stay visible on old orders but cannot be
    /// added to a trolley.
    pub discontinued: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// Tag names, sorted.
    pub tags: Vec<String>,
    /// Image URLs.
    pub images: Vec<String>,
}

impl Product {
    /// Whether the product can currently be placed in a trolley.
    #[must_use]
    pub const fn is_sellable(&self) -> bool {
        !self.discontinued && self.available >= 1
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub available: i32,
}

/// Whitelisted product fields for partial update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub available: Option<i32>,
    pub discontinued: Option<bool>,
}

impl ProductUpdate {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.available.is_none()
            && self.discontinued.is_none()
    }
}
