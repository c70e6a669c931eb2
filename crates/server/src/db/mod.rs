//! Database operations against the MariaDB store.
//!
//! # Tables
//!
//! - `account`, `address` - identity and shipping locations
//! - `product`, `tag`, `product_tag`, `image`, `product_image` - catalogue
//! - `line_item`, `trolley_item` - per-account trolley contents
//! - `orders`, `order_item` - placed orders with frozen sale prices
//! - `invoice`, `receipt`, `report` - write-once financial documents
//!
//! All queries use bound parameters; every multi-statement workflow runs in a
//! single transaction that commits at the end or rolls back on any failure.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p awe-electronics-cli -- migrate
//! ```

pub mod accounts;
pub mod orders;
pub mod products;
pub mod trolley;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

/// Fixed pool size; one connection per in-flight request.
const MAX_CONNECTIONS: u32 = 5;

/// How long to wait for a free connection before giving up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Server-side deadline for any single statement, in seconds.
const STATEMENT_TIMEOUT_SECS: u32 = 30;

/// MariaDB "query execution was interrupted (max_statement_time exceeded)".
const ER_STATEMENT_TIMEOUT: u16 = 1969;

/// InnoDB "deadlock found when trying to get lock".
const ER_LOCK_DEADLOCK: u16 = 1213;

/// InnoDB "lock wait timeout exceeded".
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;

/// Create a MariaDB connection pool with sensible defaults.
///
/// The pool is bounded at [`MAX_CONNECTIONS`]; waiting longer than
/// [`ACQUIRE_TIMEOUT`] for a connection surfaces as
/// [`RepositoryError::Unavailable`] rather than blocking forever. Each
/// connection also carries a server-side statement deadline, so a hung
/// round trip is aborted by MariaDB instead of pinning the handler; the
/// resulting error maps to [`RepositoryError::Unavailable`] as well.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // MariaDB aborts any statement running longer than this
                // with ER_STATEMENT_TIMEOUT.
                sqlx::query(&format!(
                    "SET SESSION max_statement_time = {STATEMENT_TIMEOUT_SECS}"
                ))
                .execute(conn)
                .await?;
                Ok(())
            })
        })
        .connect(database_url.expose_secret())
        .await
}

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,

    /// The operation conflicts with existing state (duplicate key, lost race).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller supplied invalid input (nothing was changed).
    #[error("invalid input: {0}")]
    Invalid(String),

    /// A row held data the application cannot interpret.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The connection pool is exhausted or closed; retry later.
    #[error("database temporarily unavailable")]
    Unavailable,
}

impl From<sqlx::Error> for RepositoryError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Unavailable,
            sqlx::Error::Database(db_err) => {
                let number = db_err
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .map(sqlx::mysql::MySqlDatabaseError::number);
                match number.and_then(classify_server_error) {
                    Some(mapped) => mapped,
                    None => Self::Database(sqlx::Error::Database(db_err)),
                }
            }
            other => Self::Database(other),
        }
    }
}

/// Map a MariaDB server error number to a retryable repository error.
///
/// Statement-deadline expiry means the server is overloaded or a lock is
/// stuck, so the caller should back off and retry (`Unavailable`, 503).
/// Deadlocks and lock-wait timeouts mean this transaction lost a race and
/// can be retried immediately (`Conflict`, 409).
fn classify_server_error(number: u16) -> Option<RepositoryError> {
    match number {
        ER_STATEMENT_TIMEOUT => Some(RepositoryError::Unavailable),
        ER_LOCK_DEADLOCK | ER_LOCK_WAIT_TIMEOUT => Some(RepositoryError::Conflict(
            "the operation lost a race for a row lock, try again".to_owned(),
        )),
        _ => None,
    }
}

impl RepositoryError {
    /// Map a sqlx error, turning a unique-key violation into [`Self::Conflict`].
    pub(crate) fn or_conflict(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolTimedOut),
            RepositoryError::Unavailable
        ));
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolClosed),
            RepositoryError::Unavailable
        ));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::RowNotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn test_statement_timeout_maps_to_unavailable() {
        assert!(matches!(
            classify_server_error(ER_STATEMENT_TIMEOUT),
            Some(RepositoryError::Unavailable)
        ));
    }

    #[test]
    fn test_lock_errors_map_to_conflict() {
        assert!(matches!(
            classify_server_error(ER_LOCK_DEADLOCK),
            Some(RepositoryError::Conflict(_))
        ));
        assert!(matches!(
            classify_server_error(ER_LOCK_WAIT_TIMEOUT),
            Some(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn test_other_server_errors_pass_through() {
        // 1062 is a duplicate-key violation, handled by `or_conflict` at
        // the call sites that expect it.
        assert!(classify_server_error(1062).is_none());
    }
}
