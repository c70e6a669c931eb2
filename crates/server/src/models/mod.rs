//! Domain models for the store.
//!
//! These are typed records per entity; query results are always mapped into
//! these rather than handed around as loose key-value data.

pub mod account;
pub mod order;
pub mod product;
pub mod trolley;

pub use account::{
    Account, AccountFilter, AccountSelector, AccountUpdate, Address, CurrentAccount, NewAccount,
};
pub use order::{Invoice, Order, OrderLine, Receipt, Report};
pub use product::{NewProduct, Product, ProductUpdate};
pub use trolley::TrolleyLine;

/// Session keys used by the auth middleware and routes.
pub mod session_keys {
    /// The logged-in account, stored as [`super::CurrentAccount`].
    pub const CURRENT_ACCOUNT: &str = "current_account";
}
