//! Trolley view types.

use rust_decimal::Decimal;
use serde::Serialize;

use awe_electronics_core::{LineItemId, ProductId};

/// One line of an account's trolley, joined with its product.
///
/// `price_at_sale` is always `None` while the line sits in a trolley; it is
/// frozen by the order workflow, never by trolley mutations.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TrolleyLine {
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub price_at_sale: Option<Decimal>,
    /// The product's price right now; what the line would cost if ordered.
    pub current_price: Decimal,
}
