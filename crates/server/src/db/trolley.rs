//! Trolley repository.
//!
//! Maintains the mapping from an account to its in-trolley line items and
//! keeps it consistent with the `line_item` table. Every mutation here is a
//! single transaction; a failure at any step rolls the whole operation back,
//! so a half-linked line item is never observable.

use sqlx::{MySqlPool, QueryBuilder};

use awe_electronics_core::{AccountId, LineItemId, ProductId};

use super::RepositoryError;
use super::accounts::id_from_insert;
use crate::models::TrolleyLine;

/// Errors from trolley operations.
#[derive(Debug, thiserror::Error)]
pub enum TrolleyError {
    /// Quantity below the floor of 1. Nothing was changed.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    /// The product does not exist or is discontinued.
    #[error("product not found or discontinued")]
    ProductNotFound,

    /// The line item is not linked to this account's trolley.
    #[error("line item not found in trolley")]
    NotInTrolley,

    /// Lower-level repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for TrolleyError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::from(e))
    }
}

/// Repository for trolley database operations.
pub struct TrolleyRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> TrolleyRepository<'a> {
    /// Create a new trolley repository.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Read an account's trolley, oldest line first. Side-effect free.
    ///
    /// # Errors
    ///
    /// Returns `TrolleyError::Repository` if the query fails.
    pub async fn get(&self, account_id: AccountId) -> Result<Vec<TrolleyLine>, TrolleyError> {
        let lines = sqlx::query_as::<_, TrolleyLine>(
            r"
            SELECT li.id AS line_item_id, li.product_id, p.name AS product_name,
                   li.quantity, li.price_at_sale, p.price AS current_price
            FROM trolley_item ti
            JOIN line_item li ON li.id = ti.line_item_id
            JOIN product p ON p.id = li.product_id
            WHERE ti.account_id = ?
            ORDER BY li.id ASC
            ",
        )
        .bind(account_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Add a product to the trolley as a fresh line item.
    ///
    /// The line item insert and the trolley link are one transaction: if the
    /// link fails, the line item insert is rolled back too.
    ///
    /// # Errors
    ///
    /// Returns `TrolleyError::InvalidQuantity` for a quantity below 1.
    /// Returns `TrolleyError::ProductNotFound` for an unknown or
    /// discontinued product.
    pub async fn add(
        &self,
        account_id: AccountId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<LineItemId, TrolleyError> {
        if quantity < 1 {
            return Err(TrolleyError::InvalidQuantity(quantity));
        }

        let mut tx = self.pool.begin().await?;

        let sellable: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM product WHERE id = ? AND discontinued = FALSE")
                .bind(product_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        if sellable.is_none() {
            return Err(TrolleyError::ProductNotFound);
        }

        let result = sqlx::query("INSERT INTO line_item (product_id, quantity) VALUES (?, ?)")
            .bind(product_id.as_i32())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        let line_item_id = LineItemId::new(id_from_insert(result.last_insert_id())?);

        sqlx::query("INSERT INTO trolley_item (account_id, line_item_id) VALUES (?, ?)")
            .bind(account_id.as_i32())
            .bind(line_item_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(%account_id, %product_id, quantity, %line_item_id, "added to trolley");
        Ok(line_item_id)
    }

    /// Set the quantity of the trolley-linked line item for a product.
    ///
    /// # Errors
    ///
    /// Returns `TrolleyError::InvalidQuantity` for a quantity below 1.
    /// Returns `TrolleyError::NotInTrolley` if the account's trolley holds
    /// no line item for this product.
    pub async fn change_quantity(
        &self,
        account_id: AccountId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), TrolleyError> {
        if quantity < 1 {
            return Err(TrolleyError::InvalidQuantity(quantity));
        }

        let mut tx = self.pool.begin().await?;

        // Locate first; an UPDATE alone cannot distinguish "no such line"
        // from "quantity already had that value" under MariaDB.
        let line: Option<(i32,)> = sqlx::query_as(
            r"
            SELECT li.id
            FROM trolley_item ti
            JOIN line_item li ON li.id = ti.line_item_id
            WHERE ti.account_id = ? AND li.product_id = ?
            ORDER BY li.id ASC
            LIMIT 1
            FOR UPDATE
            ",
        )
        .bind(account_id.as_i32())
        .bind(product_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((line_item_id,)) = line else {
            return Err(TrolleyError::NotInTrolley);
        };

        sqlx::query("UPDATE line_item SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(line_item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Remove one line item from the trolley and delete it.
    ///
    /// The ownership check and both deletes are one transaction.
    ///
    /// # Errors
    ///
    /// Returns `TrolleyError::NotInTrolley` if the line item is not linked
    /// to this account's trolley.
    pub async fn remove_line_item(
        &self,
        account_id: AccountId,
        line_item_id: LineItemId,
    ) -> Result<(), TrolleyError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM trolley_item WHERE account_id = ? AND line_item_id = ?",
        )
        .bind(account_id.as_i32())
        .bind(line_item_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TrolleyError::NotInTrolley);
        }

        sqlx::query("DELETE FROM line_item WHERE id = ?")
            .bind(line_item_id.as_i32())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Empty the trolley, deleting the now-orphaned line items.
    ///
    /// Line items referenced by an `order_item` row are never deleted here,
    /// even if one were erroneously still trolley-linked. Returns the number
    /// of line items actually deleted; 0 for an already-empty trolley.
    ///
    /// # Errors
    ///
    /// Returns `TrolleyError::Repository` with a `Conflict` if a concurrent
    /// mutation changes the trolley between the locked read and the delete.
    pub async fn clear(&self, account_id: AccountId) -> Result<u64, TrolleyError> {
        let mut tx = self.pool.begin().await?;

        let linked: Vec<(i32,)> = sqlx::query_as(
            "SELECT line_item_id FROM trolley_item WHERE account_id = ? FOR UPDATE",
        )
        .bind(account_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        if linked.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i32> = linked.into_iter().map(|(id,)| id).collect();

        let mut qb: QueryBuilder<'_, sqlx::MySql> =
            QueryBuilder::new("DELETE FROM trolley_item WHERE account_id = ");
        qb.push_bind(account_id.as_i32());
        qb.push(" AND line_item_id IN (");
        push_id_list(&mut qb, &ids);
        qb.push(")");
        let unlinked = qb.build().execute(&mut *tx).await?.rows_affected();

        if unlinked != ids.len() as u64 {
            return Err(RepositoryError::Conflict(format!(
                "trolley changed during clear: expected {} rows, deleted {unlinked}",
                ids.len()
            ))
            .into());
        }

        let mut qb: QueryBuilder<'_, sqlx::MySql> =
            QueryBuilder::new("DELETE FROM line_item WHERE id IN (");
        push_id_list(&mut qb, &ids);
        qb.push(") AND id NOT IN (SELECT line_item_id FROM order_item)");
        let deleted = qb.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;

        tracing::debug!(%account_id, deleted, "cleared trolley");
        Ok(deleted)
    }
}

/// Push a comma-separated bind list of ids.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, sqlx::MySql>, ids: &[i32]) {
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
}
