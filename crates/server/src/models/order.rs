//! Order and financial document domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use awe_electronics_core::{
    AccountId, AddressId, InvoiceId, LineItemId, OrderId, ProductId, ReceiptId, ReportId,
};

/// A placed order. Immutable once created except through `order_item` linkage.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Placing account; nulled if the account is later deleted.
    pub account_id: Option<AccountId>,
    /// Shipping address; nulled if the address is later deleted.
    pub address_id: Option<AddressId>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// One historical line of a placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    /// Price frozen at the moment the order was placed.
    pub price_at_sale: Decimal,
}

/// A write-once invoice document for an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: InvoiceId,
    pub account_id: Option<AccountId>,
    pub order_id: OrderId,
    #[serde(skip)]
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// A write-once receipt document for an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Receipt {
    pub id: ReceiptId,
    pub account_id: Option<AccountId>,
    pub order_id: OrderId,
    #[serde(skip)]
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// A write-once report document created by a staff account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Report {
    pub id: ReportId,
    pub account_id: Option<AccountId>,
    #[serde(skip)]
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
