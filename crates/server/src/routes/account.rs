//! Self-service account route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use awe_electronics_core::{AddressId, Email};

use crate::db::accounts::AccountRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAccount;
use crate::models::{Account, AccountSelector, AccountUpdate, Address};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Fields an account may change about itself. Role and status are
/// deliberately absent; only administrators touch those.
#[derive(Debug, Deserialize)]
pub struct UpdateSelfBody {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Password change form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
    pub new_password: String,
}

/// New address form data.
#[derive(Debug, Deserialize)]
pub struct NewAddressBody {
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct AddressCreated {
    pub id: AddressId,
}

/// Get the caller's own account.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn get_self(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
) -> Result<Json<Account>> {
    let accounts = AccountRepository::new(state.pool());
    let account = accounts
        .get(&AccountSelector::ById(caller.id))
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(Json(account))
}

/// Update the caller's own account.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn update_self(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Json(body): Json<UpdateSelfBody>,
) -> Result<Json<Account>> {
    let email = match body.email.as_deref() {
        Some(raw) => Some(Email::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?),
        None => None,
    };

    let accounts = AccountRepository::new(state.pool());
    accounts
        .update(
            caller.id,
            &AccountUpdate {
                email,
                first_name: body.first_name,
                last_name: body.last_name,
                ..AccountUpdate::default()
            },
        )
        .await?;

    let account = accounts
        .get(&AccountSelector::ById(caller.id))
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(Json(account))
}

/// Change the caller's own password.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Json(body): Json<ChangePasswordBody>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool());
    auth.change_password(caller.id, &body.new_password).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's addresses.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn list_addresses(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
) -> Result<Json<Vec<Address>>> {
    let accounts = AccountRepository::new(state.pool());
    Ok(Json(accounts.get_addresses(caller.id).await?))
}

/// Add an address for the caller.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Json(body): Json<NewAddressBody>,
) -> Result<(StatusCode, Json<AddressCreated>)> {
    let location = body.location.trim();
    if location.is_empty() {
        return Err(AppError::BadRequest("location cannot be empty".to_owned()));
    }

    let accounts = AccountRepository::new(state.pool());
    let id = accounts.create_address(caller.id, location).await?;

    Ok((StatusCode::CREATED, Json(AddressCreated { id })))
}

/// Delete one of the caller's addresses.
#[instrument(skip_all, fields(account_id = %caller.id, %address_id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Path(address_id): Path<AddressId>,
) -> Result<StatusCode> {
    let accounts = AccountRepository::new(state.pool());
    accounts.delete_address(caller.id, address_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
