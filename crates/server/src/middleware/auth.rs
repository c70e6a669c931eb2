//! Authentication middleware and extractors.
//!
//! The session carries the verified account identity; these extractors pull
//! it out for route handlers. Everything downstream trusts this identity
//! completely and performs no further authentication.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAccount, session_keys};

/// Extractor that requires a logged-in account (any role).
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAccount(account): RequireAccount) -> impl IntoResponse {
///     format!("account {}", account.id)
/// }
/// ```
pub struct RequireAccount(pub CurrentAccount);

/// Extractor that requires an account allowed to manage the catalogue
/// (owner, admin, or employee).
pub struct RequireStaff(pub CurrentAccount);

/// Extractor that requires an administrative account (owner or admin).
pub struct RequireAdmin(pub CurrentAccount);

/// Error returned when a required identity or role is missing.
pub enum AuthRejection {
    /// Not logged in.
    Unauthorized,
    /// Logged in, but the role is not allowed here.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

async fn current_account(parts: &mut Parts) -> Result<CurrentAccount, AuthRejection> {
    // Session is put into extensions by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    session
        .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)
}

impl<S> FromRequestParts<S> for RequireAccount
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_account(parts).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = current_account(parts).await?;
        if !account.role.is_staff() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(account))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = current_account(parts).await?;
        if !account.role.is_administrative() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(account))
    }
}
