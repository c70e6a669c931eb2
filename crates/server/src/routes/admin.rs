//! Administrative routes. Account management requires an administrative
//! role via [`RequireAdmin`]; the order overview is open to any staff
//! member via [`RequireStaff`].

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use awe_electronics_core::{AccountId, AccountStatus, ReportId, Role};

use crate::db::accounts::AccountRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireStaff};
use crate::models::{Account, AccountFilter, AccountSelector, AccountUpdate, Order};
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAccountBody {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Admin-side account update. Unlike self-service updates, role and status
/// are editable here.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateBody {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordBody {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    pub account_ids: Vec<AccountId>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct ReportCreated {
    pub report_id: ReportId,
}

/// List accounts, optionally filtered by role, status, or age.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn list_accounts(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Query(filter): Query<AccountFilter>,
) -> Result<Json<Vec<Account>>> {
    let accounts = AccountRepository::new(state.pool());
    Ok(Json(accounts.list(&filter).await?))
}

/// Create an account with an explicit role.
#[instrument(skip_all, fields(account_id = %caller.id, role = %body.role))]
pub async fn create_account(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Json(body): Json<CreateAccountBody>,
) -> Result<(StatusCode, Json<Account>)> {
    let auth = AuthService::new(state.pool());
    let account = auth
        .create_account(&body.email, &body.password, body.role)
        .await?;

    tracing::info!(created_id = %account.id, role = %account.role, "account created by admin");

    Ok((StatusCode::CREATED, Json(account)))
}

/// Fetch a single account by id.
#[instrument(skip_all, fields(account_id = %caller.id, %target_id))]
pub async fn get_account(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(target_id): Path<AccountId>,
) -> Result<Json<Account>> {
    let accounts = AccountRepository::new(state.pool());
    let account = accounts
        .get(&AccountSelector::ById(target_id))
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_owned()))?;

    Ok(Json(account))
}

/// Update account fields, including role and status.
#[instrument(skip_all, fields(account_id = %caller.id, %target_id))]
pub async fn update_account(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(target_id): Path<AccountId>,
    Json(body): Json<AdminUpdateBody>,
) -> Result<StatusCode> {
    let email = match body.email.as_deref() {
        Some(raw) => Some(
            awe_electronics_core::Email::parse(raw)
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        ),
        None => None,
    };

    let accounts = AccountRepository::new(state.pool());
    accounts
        .update(
            target_id,
            &AccountUpdate {
                email,
                first_name: body.first_name,
                last_name: body.last_name,
                role: body.role,
                status: body.status,
                ..AccountUpdate::default()
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Set a new password for any account.
#[instrument(skip_all, fields(account_id = %caller.id, %target_id))]
pub async fn set_password(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(target_id): Path<AccountId>,
    Json(body): Json<SetPasswordBody>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool());
    auth.change_password(target_id, &body.password).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deactivate an account (status → inactive).
#[instrument(skip_all, fields(account_id = %caller.id, %target_id))]
pub async fn deactivate_account(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(target_id): Path<AccountId>,
) -> Result<StatusCode> {
    set_status(&state, target_id, AccountStatus::Inactive).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Condemn an account, permanently barring it from logging in.
#[instrument(skip_all, fields(account_id = %caller.id, %target_id))]
pub async fn condemn_account(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Path(target_id): Path<AccountId>,
) -> Result<StatusCode> {
    set_status(&state, target_id, AccountStatus::Condemned).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_status(state: &AppState, target_id: AccountId, status: AccountStatus) -> Result<()> {
    let accounts = AccountRepository::new(state.pool());
    accounts
        .update(
            target_id,
            &AccountUpdate {
                status: Some(status),
                ..AccountUpdate::default()
            },
        )
        .await?;

    Ok(())
}

/// Delete a batch of accounts. Returns how many rows went away.
#[instrument(skip_all, fields(account_id = %caller.id, count = body.account_ids.len()))]
pub async fn delete_accounts(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
    Json(body): Json<BulkDeleteBody>,
) -> Result<Json<Deleted>> {
    if body.account_ids.contains(&caller.id) {
        return Err(AppError::BadRequest(
            "cannot delete your own account".to_owned(),
        ));
    }

    let accounts = AccountRepository::new(state.pool());
    let deleted = accounts.delete_many(&body.account_ids).await?;

    tracing::info!(deleted, "accounts deleted by admin");

    Ok(Json(Deleted { deleted }))
}

/// List every order in the store, newest first. Open to any staff member,
/// matching the per-order fetch they already have.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool());
    Ok(Json(orders.get_all_orders().await?))
}

/// Generate and store an inventory report over the current catalogue.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn create_report(
    State(state): State<AppState>,
    RequireAdmin(caller): RequireAdmin,
) -> Result<(StatusCode, Json<ReportCreated>)> {
    #[derive(Serialize)]
    struct InventoryLine {
        product_id: awe_electronics_core::ProductId,
        name: String,
        stock: i32,
        available: i32,
        discontinued: bool,
    }

    let products = ProductRepository::new(state.pool());
    let lines: Vec<InventoryLine> = products
        .get_all()
        .await?
        .into_iter()
        .map(|p| InventoryLine {
            product_id: p.id,
            name: p.name,
            stock: p.stock,
            available: p.available,
            discontinued: p.discontinued,
        })
        .collect();

    let payload = serde_json::to_vec(&lines).map_err(|e| AppError::Internal(e.to_string()))?;

    let orders = OrderRepository::new(state.pool());
    let report_id = orders.save_report(caller.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(ReportCreated { report_id })))
}
