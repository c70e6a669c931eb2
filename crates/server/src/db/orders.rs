//! Order repository.
//!
//! The order-placement workflow is the one genuinely multi-step transaction
//! in this system: it snapshots sale prices onto line items, links them to a
//! new order, and consumes the trolley rows, all-or-nothing. The account's
//! trolley rows are taken `FOR UPDATE` so two concurrent checkouts for the
//! same account serialize instead of double-spending the trolley.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{MySqlPool, QueryBuilder};

use awe_electronics_core::{
    AccountId, AddressId, InvoiceId, OrderId, ProductId, ReceiptId, ReportId,
};

use super::RepositoryError;
use super::accounts::id_from_insert;
use super::trolley::push_id_list;
use crate::models::{Invoice, Order, OrderLine, Receipt};

/// Errors from order placement.
///
/// The first four variants are validation failures the caller can correct;
/// `Conflict` means a concurrent mutation lost the race and the whole
/// operation should be retried from a fresh read; `Repository` covers
/// internal failures that are opaque to the user.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The address does not belong to the ordering account.
    #[error("address does not belong to this account")]
    ForeignAddress,

    /// Nothing in the trolley to order.
    #[error("trolley is empty")]
    EmptyTrolley,

    /// A trolley product vanished or was discontinued before checkout.
    #[error("product {0} is no longer available")]
    ProductUnavailable(ProductId),

    /// Not enough sellable inventory for a line's quantity.
    #[error("insufficient availability for product {0}")]
    InsufficientStock(ProductId),

    /// A concurrent mutation invalidated the trolley snapshot; retry.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Lower-level repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::from(e))
    }
}

/// A trolley line as read inside the order transaction.
#[derive(sqlx::FromRow)]
struct PendingLine {
    line_item_id: i32,
    product_id: i32,
    quantity: i32,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Atomically convert the account's trolley into a placed order.
    ///
    /// One transaction, committed only after every step succeeds:
    ///
    /// 1. verify the address belongs to the account
    /// 2. lock and read the trolley lines (`FOR UPDATE`)
    /// 3. snapshot each product's current price into `price_at_sale`
    /// 4. decrement `product.available`, guarded by `available >= quantity`
    /// 5. insert the `orders` row
    /// 6. insert one `order_item` link per line
    /// 7. delete exactly the consumed trolley rows, count-checked
    ///
    /// Any failure rolls everything back: no order row, no links, no price
    /// mutations, no trolley deletions survive.
    ///
    /// # Errors
    ///
    /// See [`OrderError`] for the taxonomy.
    pub async fn create_order(
        &self,
        account_id: AccountId,
        address_id: AddressId,
    ) -> Result<OrderId, OrderError> {
        let mut tx = self.pool.begin().await?;

        // 1. Address ownership.
        let owned: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM address WHERE id = ? AND account_id = ?")
                .bind(address_id.as_i32())
                .bind(account_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Err(OrderError::ForeignAddress);
        }

        // 2. Lock the trolley rows for this account. The lock is what makes
        //    the later count-checked delete race-free.
        let lines: Vec<PendingLine> = sqlx::query_as(
            r"
            SELECT li.id AS line_item_id, li.product_id, li.quantity
            FROM trolley_item ti
            JOIN line_item li ON li.id = ti.line_item_id
            WHERE ti.account_id = ?
            ORDER BY li.id ASC
            FOR UPDATE
            ",
        )
        .bind(account_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyTrolley);
        }

        // 3 + 4. Price snapshot and availability decrement, per line. The
        // order is billed at the price at this moment, never a
        // client-supplied or add-to-trolley-time price. Products are locked
        // in ascending product-id order so two checkouts sharing products
        // cannot deadlock on each other's row locks.
        let mut lock_order: Vec<&PendingLine> = lines.iter().collect();
        lock_order.sort_unstable_by_key(|l| l.product_id);
        for line in lock_order {
            let product_id = ProductId::new(line.product_id);

            let price: Option<(Decimal,)> = sqlx::query_as(
                "SELECT price FROM product WHERE id = ? AND discontinued = FALSE FOR UPDATE",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?;
            let Some((price,)) = price else {
                return Err(OrderError::ProductUnavailable(product_id));
            };

            sqlx::query("UPDATE line_item SET price_at_sale = ? WHERE id = ?")
                .bind(price)
                .bind(line.line_item_id)
                .execute(&mut *tx)
                .await?;

            let decremented = sqlx::query(
                "UPDATE product SET available = available - ? WHERE id = ? AND available >= ?",
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
            if decremented.rows_affected() == 0 {
                return Err(OrderError::InsufficientStock(product_id));
            }
        }

        // 5. The order row itself.
        let result =
            sqlx::query("INSERT INTO orders (account_id, address_id, created_at) VALUES (?, ?, ?)")
                .bind(account_id.as_i32())
                .bind(address_id.as_i32())
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
        let order_id = OrderId::new(id_from_insert(result.last_insert_id())?);

        // 6. Link every line to the order, freezing its state.
        for line in &lines {
            sqlx::query("INSERT INTO order_item (order_id, line_item_id) VALUES (?, ?)")
                .bind(order_id.as_i32())
                .bind(line.line_item_id)
                .execute(&mut *tx)
                .await?;
        }

        // 7. Consume exactly the trolley rows that were locked in step 2;
        //    lines added concurrently by another request are left alone.
        let ids: Vec<i32> = lines.iter().map(|l| l.line_item_id).collect();
        let mut qb: QueryBuilder<'_, sqlx::MySql> =
            QueryBuilder::new("DELETE FROM trolley_item WHERE account_id = ");
        qb.push_bind(account_id.as_i32());
        qb.push(" AND line_item_id IN (");
        push_id_list(&mut qb, &ids);
        qb.push(")");
        let removed = qb.build().execute(&mut *tx).await?.rows_affected();

        if removed != ids.len() as u64 {
            return Err(OrderError::Conflict(format!(
                "trolley changed during checkout: expected {} rows, deleted {removed}",
                ids.len()
            )));
        }

        tx.commit().await?;

        tracing::info!(%account_id, %order_id, lines = ids.len(), "order placed");
        Ok(order_id)
    }

    /// List an account's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_orders(&self, account_id: AccountId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, account_id, address_id, created_at FROM orders \
             WHERE account_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(account_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List every order in the store, newest first.
    ///
    /// Backs the staff overview; customer-facing listings go through
    /// [`Self::get_orders`] instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_all_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT id, account_id, address_id, created_at FROM orders \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Get a single order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, account_id, address_id, created_at FROM orders WHERE id = ?",
        )
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// The historical lines of a placed order, with frozen prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a linked line item has
    /// no frozen price, which the order workflow makes impossible.
    pub async fn get_order_items(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            line_item_id: i32,
            product_id: i32,
            product_name: String,
            quantity: i32,
            price_at_sale: Option<Decimal>,
        }

        let rows: Vec<Row> = sqlx::query_as(
            r"
            SELECT li.id AS line_item_id, li.product_id, p.name AS product_name,
                   li.quantity, li.price_at_sale
            FROM order_item oi
            JOIN line_item li ON li.id = oi.line_item_id
            JOIN product p ON p.id = li.product_id
            WHERE oi.order_id = ?
            ORDER BY li.id ASC
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let price_at_sale = r.price_at_sale.ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "ordered line item {} has no frozen price",
                        r.line_item_id
                    ))
                })?;
                Ok(OrderLine {
                    line_item_id: r.line_item_id.into(),
                    product_id: r.product_id.into(),
                    product_name: r.product_name,
                    quantity: r.quantity,
                    price_at_sale,
                })
            })
            .collect()
    }

    // =========================================================================
    // Financial documents (write-once)
    // =========================================================================

    /// Store the invoice document for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order already has an invoice.
    pub async fn save_invoice(
        &self,
        account_id: AccountId,
        order_id: OrderId,
        payload: &[u8],
    ) -> Result<InvoiceId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO invoice (account_id, order_id, payload, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(account_id.as_i32())
        .bind(order_id.as_i32())
        .bind(payload)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::or_conflict(e, "order already has an invoice"))?;

        id_from_insert(result.last_insert_id()).map(InvoiceId::new)
    }

    /// Store the receipt document for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order already has a receipt.
    pub async fn save_receipt(
        &self,
        account_id: AccountId,
        order_id: OrderId,
        payload: &[u8],
    ) -> Result<ReceiptId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO receipt (account_id, order_id, payload, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(account_id.as_i32())
        .bind(order_id.as_i32())
        .bind(payload)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::or_conflict(e, "order already has a receipt"))?;

        id_from_insert(result.last_insert_id()).map(ReceiptId::new)
    }

    /// Store a staff report document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn save_report(
        &self,
        account_id: AccountId,
        payload: &[u8],
    ) -> Result<ReportId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO report (account_id, payload, created_at) VALUES (?, ?, ?)",
        )
        .bind(account_id.as_i32())
        .bind(payload)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        id_from_insert(result.last_insert_id()).map(ReportId::new)
    }

    /// Fetch the invoice for an order, if one was stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_invoice(&self, order_id: OrderId) -> Result<Option<Invoice>, RepositoryError> {
        let invoice = sqlx::query_as::<_, Invoice>(
            "SELECT id, account_id, order_id, payload, created_at FROM invoice WHERE order_id = ?",
        )
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(invoice)
    }

    /// Fetch the receipt for an order, if one was stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_receipt(&self, order_id: OrderId) -> Result<Option<Receipt>, RepositoryError> {
        let receipt = sqlx::query_as::<_, Receipt>(
            "SELECT id, account_id, order_id, payload, created_at FROM receipt WHERE order_id = ?",
        )
        .bind(order_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(receipt)
    }
}
