//! HTTP middleware: sessions and authentication extractors.

pub mod auth;
pub mod session;

pub use auth::{RequireAccount, RequireAdmin, RequireStaff};
pub use session::{create_session_layer, create_session_store};
