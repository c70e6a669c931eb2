//! Authentication error types.

use awe_electronics_core::EmailError;

use crate::db::RepositoryError;

/// Errors from authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The password fails the policy; the message says which rule.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// An account with this email already exists.
    #[error("account already exists")]
    AccountAlreadyExists,

    /// Wrong email or password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account is inactive or condemned.
    #[error("account is disabled")]
    AccountDisabled,

    /// The target account does not exist.
    #[error("account not found")]
    AccountNotFound,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Lower-level repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
