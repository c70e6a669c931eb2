//! Authentication service.
//!
//! Registration, guest creation, login, and password changes. Hashing uses
//! argon2 with a per-call random salt; the policy below is checked before
//! any hash is computed or persisted.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::MySqlPool;
use uuid::Uuid;

use awe_electronics_core::{AccountId, AccountStatus, Email, Role};

use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::models::{Account, AccountSelector, AccountUpdate, NewAccount};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a MySqlPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    /// Register a new customer account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password fails the policy.
    /// Returns `AuthError::AccountAlreadyExists` if the email is taken.
    pub async fn register(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        self.create_account(email, password, Role::Customer).await
    }

    /// Create an account with an explicit role (admin operation).
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let id = self
            .accounts
            .create(&NewAccount {
                email: email.clone(),
                password_hash,
                role,
                status: AccountStatus::Unverified,
                first_name: None,
                last_name: None,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::AccountAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.fetch_created(id).await
    }

    /// Create an anonymous guest account so an unauthenticated visitor can
    /// hold a trolley. Guests have a generated placeholder email and cannot
    /// log in with a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` on database failure.
    pub async fn create_guest(&self) -> Result<Account, AuthError> {
        let local = Uuid::new_v4().simple().to_string();
        let email = Email::parse(&format!("guest_{}@guest.invalid", &local[..8]))?;

        let id = self
            .accounts
            .create(&NewAccount {
                email,
                password_hash: String::new(),
                role: Role::Guest,
                status: AccountStatus::Active,
                first_name: None,
                last_name: None,
            })
            .await?;

        self.fetch_created(id).await
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or
    /// the password is wrong; `AuthError::AccountDisabled` for inactive or
    /// condemned accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        let (account, password_hash) = self
            .accounts
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Guest rows have an empty hash and can never authenticate.
        if password_hash.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        verify_password(password, &password_hash)?;

        if !account.status.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(account)
    }

    /// Change an account's password, re-validating the policy.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password fails the
    /// policy; `AuthError::AccountNotFound` for an unknown account.
    pub async fn change_password(
        &self,
        account_id: AccountId,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        self.accounts
            .update(
                account_id,
                &AccountUpdate {
                    password_hash: Some(password_hash),
                    ..AccountUpdate::default()
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })
    }

    async fn fetch_created(&self, id: AccountId) -> Result<Account, AuthError> {
        self.accounts
            .get(&AccountSelector::ById(id))
            .await?
            .ok_or_else(|| {
                AuthError::Repository(RepositoryError::DataCorruption(format!(
                    "created account {id} not readable"
                )))
            })
    }
}

/// Check the password policy: length, upper, lower, digit, special.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` naming the first failed rule.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(AuthError::WeakPassword(
            "password must contain an uppercase letter".to_owned(),
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(AuthError::WeakPassword(
            "password must contain a lowercase letter".to_owned(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "password must contain a digit".to_owned(),
        ));
    }
    if password.chars().all(char::is_alphanumeric) {
        return Err(AuthError::WeakPassword(
            "password must contain a special character".to_owned(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id with a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_accepts_strong() {
        assert!(validate_password("Str0ng!pass").is_ok());
        assert!(validate_password("aB3#defg").is_ok());
    }

    #[test]
    fn test_password_policy_length() {
        let err = validate_password("aB3#xyz").unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(msg) if msg.contains("8 characters")));
    }

    #[test]
    fn test_password_policy_character_classes() {
        assert!(matches!(
            validate_password("lower3#case").unwrap_err(),
            AuthError::WeakPassword(msg) if msg.contains("uppercase")
        ));
        assert!(matches!(
            validate_password("UPPER3#CASE").unwrap_err(),
            AuthError::WeakPassword(msg) if msg.contains("lowercase")
        ));
        assert!(matches!(
            validate_password("NoDigits!here").unwrap_err(),
            AuthError::WeakPassword(msg) if msg.contains("digit")
        ));
        assert!(matches!(
            validate_password("NoSpecial3here").unwrap_err(),
            AuthError::WeakPassword(msg) if msg.contains("special")
        ));
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Str0ng!pass").unwrap();
        assert!(verify_password("Str0ng!pass", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_empty_hash() {
        assert!(matches!(
            verify_password("anything", ""),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
