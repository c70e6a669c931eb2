//! Authentication route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::{Account, CurrentAccount, session_keys};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

async fn establish_session(session: &Session, account: &Account) -> Result<()> {
    // Fresh session id on privilege change, against session fixation
    session.cycle_id().await?;
    session
        .insert(
            session_keys::CURRENT_ACCOUNT,
            CurrentAccount {
                id: account.id,
                role: account.role,
            },
        )
        .await?;
    Ok(())
}

/// Register a new customer account and log it in.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Account>)> {
    let auth = AuthService::new(state.pool());
    let account = auth.register(&body.email, &body.password).await?;

    establish_session(&session, &account).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Login with email and password.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginBody>,
) -> Result<Json<Account>> {
    let auth = AuthService::new(state.pool());
    let account = auth.login(&body.email, &body.password).await?;

    establish_session(&session, &account).await?;

    Ok(Json(account))
}

/// Create an anonymous guest account and log it in, so the visitor can
/// start filling a trolley without registering.
#[instrument(skip_all)]
pub async fn guest(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Account>)> {
    let auth = AuthService::new(state.pool());
    let account = auth.create_guest().await?;

    establish_session(&session, &account).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Log out, destroying the session.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}
