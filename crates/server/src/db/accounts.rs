//! Account and address repository.

use sqlx::{MySqlPool, QueryBuilder};

use awe_electronics_core::{AccountId, AddressId, Email};

use super::RepositoryError;
use crate::models::{Account, AccountFilter, AccountSelector, AccountUpdate, Address, NewAccount};

/// Columns shared by every account query, in [`Account`] field order.
const ACCOUNT_COLUMNS: &str = "id, email, role, status, first_name, last_name, created_at";

/// Repository for account and address database operations.
pub struct AccountRepository<'a> {
    pool: &'a MySqlPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Look up an account by exactly one selector.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        selector: &AccountSelector,
    ) -> Result<Option<Account>, RepositoryError> {
        let account = match selector {
            AccountSelector::ById(id) => {
                sqlx::query_as::<_, Account>(&format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?"
                ))
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?
            }
            AccountSelector::ByEmail(email) => {
                sqlx::query_as::<_, Account>(&format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM account WHERE email = ?"
                ))
                .bind(email.as_str())
                .fetch_optional(self.pool)
                .await?
            }
        };

        Ok(account)
    }

    /// Get an account together with its password hash, by email.
    ///
    /// Returns `None` if the email is unknown. Only the auth service should
    /// call this; the hash must not travel further.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountWithHash>(&format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM account WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.account, r.password_hash)))
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewAccount) -> Result<AccountId, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO account (email, password_hash, role, status, first_name, last_name)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .bind(new.role)
        .bind(new.status)
        .bind(new.first_name.as_deref())
        .bind(new.last_name.as_deref())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::or_conflict(e, "email already exists"))?;

        id_from_insert(result.last_insert_id()).map(AccountId::new)
    }

    /// Update whitelisted account fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Invalid` if no field is set.
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    /// Returns `RepositoryError::Conflict` if a new email is already taken.
    pub async fn update(
        &self,
        id: AccountId,
        update: &AccountUpdate,
    ) -> Result<(), RepositoryError> {
        if update.is_empty() {
            return Err(RepositoryError::Invalid(
                "no valid fields to update".to_owned(),
            ));
        }

        let mut qb: QueryBuilder<'_, sqlx::MySql> = QueryBuilder::new("UPDATE account SET ");
        let mut fields = qb.separated(", ");
        if let Some(email) = &update.email {
            fields.push("email = ");
            fields.push_bind_unseparated(email.as_str());
        }
        if let Some(hash) = &update.password_hash {
            fields.push("password_hash = ");
            fields.push_bind_unseparated(hash);
        }
        if let Some(first_name) = &update.first_name {
            fields.push("first_name = ");
            fields.push_bind_unseparated(first_name);
        }
        if let Some(last_name) = &update.last_name {
            fields.push("last_name = ");
            fields.push_bind_unseparated(last_name);
        }
        if let Some(role) = update.role {
            fields.push("role = ");
            fields.push_bind_unseparated(role);
        }
        if let Some(status) = update.status {
            fields.push("status = ");
            fields.push_bind_unseparated(status);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id.as_i32());

        qb.build()
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::or_conflict(e, "email already exists"))?;

        // MariaDB reports zero affected rows for a no-op update, so existence
        // has to be checked separately rather than via rows_affected.
        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM account WHERE id = ?")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a set of accounts. Addresses cascade; orders keep their rows
    /// with a nulled account link (per schema).
    ///
    /// Deleting an account cascades its `trolley_item` links, which would
    /// strand the line items they pointed at. One transaction locks those
    /// links, removes the accounts, then deletes the stranded line items
    /// that no placed order still references.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_many(&self, ids: &[AccountId]) -> Result<u64, RepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let account_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let mut tx = self.pool.begin().await?;

        let mut qb: QueryBuilder<'_, sqlx::MySql> = QueryBuilder::new(
            "SELECT line_item_id FROM trolley_item WHERE account_id IN (",
        );
        super::trolley::push_id_list(&mut qb, &account_ids);
        qb.push(") FOR UPDATE");
        let line_item_ids: Vec<i32> = qb
            .build_query_scalar()
            .fetch_all(&mut *tx)
            .await?;

        let mut qb: QueryBuilder<'_, sqlx::MySql> =
            QueryBuilder::new("DELETE FROM account WHERE id IN (");
        super::trolley::push_id_list(&mut qb, &account_ids);
        qb.push(")");
        let deleted = qb.build().execute(&mut *tx).await?.rows_affected();

        if !line_item_ids.is_empty() {
            let mut qb: QueryBuilder<'_, sqlx::MySql> =
                QueryBuilder::new("DELETE FROM line_item WHERE id IN (");
            super::trolley::push_id_list(&mut qb, &line_item_ids);
            qb.push(") AND id NOT IN (SELECT line_item_id FROM order_item)");
            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// List accounts matching the given filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, RepositoryError> {
        let mut qb: QueryBuilder<'_, sqlx::MySql> =
            QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE 1 = 1"));
        if let Some(role) = filter.role {
            qb.push(" AND role = ");
            qb.push_bind(role);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(days) = filter.max_age_days {
            qb.push(" AND created_at >= NOW() - INTERVAL ");
            qb.push_bind(days);
            qb.push(" DAY");
        }
        qb.push(" ORDER BY id ASC");

        let accounts = qb
            .build_query_as::<Account>()
            .fetch_all(self.pool)
            .await?;

        Ok(accounts)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Create an address for an account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_address(
        &self,
        account_id: AccountId,
        location: &str,
    ) -> Result<AddressId, RepositoryError> {
        let result = sqlx::query("INSERT INTO address (account_id, location) VALUES (?, ?)")
            .bind(account_id.as_i32())
            .bind(location)
            .execute(self.pool)
            .await?;

        id_from_insert(result.last_insert_id()).map(AddressId::new)
    }

    /// List an account's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_addresses(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            "SELECT id, account_id, location FROM address WHERE account_id = ? ORDER BY id ASC",
        )
        .bind(account_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(addresses)
    }

    /// Delete an address, checking ownership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist or
    /// belongs to a different account.
    pub async fn delete_address(
        &self,
        account_id: AccountId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM address WHERE id = ? AND account_id = ?")
            .bind(address_id.as_i32())
            .bind(account_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Internal row type; splits into `(Account, hash)` at the repository edge.
#[derive(sqlx::FromRow)]
struct AccountWithHash {
    #[sqlx(flatten)]
    account: Account,
    password_hash: String,
}

/// Convert a `last_insert_id` into an `i32` row id.
pub(crate) fn id_from_insert(id: u64) -> Result<i32, RepositoryError> {
    i32::try_from(id)
        .map_err(|_| RepositoryError::DataCorruption(format!("insert id out of range: {id}")))
}
