//! Account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use awe_electronics_core::{AccountId, AccountStatus, AddressId, Email, Role};

/// An account row, minus the password hash.
///
/// The hash is deliberately not part of this type; login fetches it through
/// a dedicated repository method and it never leaves the auth service.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Email address; `None` only for legacy guest rows.
    pub email: Option<Email>,
    /// Permission role.
    pub role: Role,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Optional first name.
    pub first_name: Option<String>,
    /// Optional last name.
    pub last_name: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// A shipping address owned by exactly one account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning account.
    pub account_id: AccountId,
    /// Free-text location.
    pub location: String,
}

/// Fields for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Whitelisted account fields for partial update.
///
/// `None` fields are left untouched; an update with every field `None` is
/// rejected as invalid rather than silently doing nothing.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

impl AccountUpdate {
    /// Whether any field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

/// Exactly one way of looking up an account.
///
/// Using an enum rather than two optional parameters makes "zero or both
/// selectors" unrepresentable.
#[derive(Debug, Clone)]
pub enum AccountSelector {
    ById(AccountId),
    ByEmail(Email),
}

/// Filters for listing accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Only accounts with this role.
    pub role: Option<Role>,
    /// Only accounts with this status.
    pub status: Option<AccountStatus>,
    /// Only accounts created within the last N days.
    pub max_age_days: Option<u32>,
}

/// The authenticated caller, as stored in the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentAccount {
    /// Verified account ID.
    pub id: AccountId,
    /// Role at login time.
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_detected() {
        assert!(AccountUpdate::default().is_empty());

        let update = AccountUpdate {
            first_name: Some("Ada".to_owned()),
            ..AccountUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
