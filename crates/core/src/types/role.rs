//! Account roles and statuses.
//!
//! Both enumerations are closed: the database stores them as MariaDB `ENUM`
//! columns and the service layer validates them at the boundary, so no value
//! outside these variants can enter the system.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
///
/// Ordered roughly by privilege: `Owner` can do everything `Admin` can,
/// `Admin` everything `Employee` can, and so on. Route guards check
/// membership in an explicit allow-list rather than ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "mysql", derive(sqlx::Type))]
#[cfg_attr(feature = "mysql", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Store owner: full access, including owner/admin account management.
    Owner,
    /// Administrator: account and catalogue management.
    Admin,
    /// Employee: catalogue management only.
    Employee,
    /// Registered customer.
    Customer,
    /// Anonymous trolley-only account.
    Guest,
}

impl Role {
    /// All roles allowed to perform administrative account operations.
    pub const ADMINISTRATIVE: &'static [Self] = &[Self::Owner, Self::Admin];

    /// All roles allowed to manage the product catalogue.
    pub const STAFF: &'static [Self] = &[Self::Owner, Self::Admin, Self::Employee];

    /// Whether this role may perform administrative account operations.
    #[must_use]
    pub fn is_administrative(self) -> bool {
        Self::ADMINISTRATIVE.contains(&self)
    }

    /// Whether this role may manage the product catalogue.
    #[must_use]
    pub fn is_staff(self) -> bool {
        Self::STAFF.contains(&self)
    }

    /// The canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Employee => "employee",
            Self::Customer => "customer",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "employee" => Ok(Self::Employee),
            "customer" => Ok(Self::Customer),
            "guest" => Ok(Self::Guest),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "mysql", derive(sqlx::Type))]
#[cfg_attr(feature = "mysql", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Created but email not yet verified.
    #[default]
    Unverified,
    /// Normal active account.
    Active,
    /// Deactivated by an administrator; login refused.
    Inactive,
    /// Permanently barred; login refused, pending deletion.
    Condemned,
}

impl AccountStatus {
    /// Whether an account in this status may log in.
    #[must_use]
    pub const fn can_login(self) -> bool {
        matches!(self, Self::Unverified | Self::Active)
    }

    /// The canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Condemned => "condemned",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown account status: {0}")]
pub struct StatusParseError(pub String);

impl std::str::FromStr for AccountStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(Self::Unverified),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "condemned" => Ok(Self::Condemned),
            other => Err(StatusParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [
            Role::Owner,
            Role::Admin,
            Role::Employee,
            Role::Customer,
            Role::Guest,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            AccountStatus::Unverified,
            AccountStatus::Active,
            AccountStatus::Inactive,
            AccountStatus::Condemned,
        ] {
            assert_eq!(status.as_str().parse::<AccountStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<AccountStatus>().is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Owner.is_administrative());
        assert!(Role::Admin.is_administrative());
        assert!(!Role::Employee.is_administrative());
        assert!(Role::Employee.is_staff());
        assert!(!Role::Customer.is_staff());
        assert!(!Role::Guest.is_staff());
    }

    #[test]
    fn test_status_login_gate() {
        assert!(AccountStatus::Active.can_login());
        assert!(AccountStatus::Unverified.can_login());
        assert!(!AccountStatus::Inactive.can_login());
        assert!(!AccountStatus::Condemned.can_login());
    }
}
