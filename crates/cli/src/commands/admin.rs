//! Staff account creation command.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use awe_electronics_core::{Email, Role};

use super::CommandError;

/// Create a staff account with the given role. The account starts active,
/// so it can log in immediately.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a bad email, a non-staff
/// role, or a duplicate email.
pub async fn create_account(email: &str, password: &str, role: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    let role: Role = role
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("unknown role: {role}")))?;
    if !role.is_staff() {
        return Err(CommandError::InvalidArgument(format!(
            "role {role} is not a staff role"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string();

    let pool = super::connect().await?;

    let result = sqlx::query(
        "INSERT INTO account (email, password_hash, role, status) VALUES (?, ?, ?, 'active')",
    )
    .bind(email.as_str())
    .bind(&password_hash)
    .bind(role)
    .execute(&pool)
    .await;

    match result {
        Ok(done) => {
            tracing::info!(
                email = %email,
                %role,
                account_id = done.last_insert_id(),
                "staff account created"
            );
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            CommandError::InvalidArgument(format!("email already exists: {email}")),
        ),
        Err(e) => Err(CommandError::Database(e)),
    }
}
