//! Session middleware configuration.
//!
//! Sets up MariaDB-backed sessions using tower-sessions.

use sqlx::MySqlPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::MySqlStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "awe_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session store. The backing table is created by
/// [`MySqlStore::migrate`], which the server runs at startup.
#[must_use]
pub fn create_session_store(pool: &MySqlPool) -> MySqlStore {
    MySqlStore::new(pool.clone())
}

/// Create the session layer over an initialized store.
#[must_use]
pub fn create_session_layer(
    store: MySqlStore,
    config: &ServerConfig,
) -> SessionManagerLayer<MySqlStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.use_secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
