//! Trolley route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use awe_electronics_core::{LineItemId, ProductId};

use crate::db::trolley::TrolleyRepository;
use crate::error::Result;
use crate::middleware::RequireAccount;
use crate::models::TrolleyLine;
use crate::state::AppState;

/// Add-to-trolley form data.
#[derive(Debug, Deserialize)]
pub struct AddBody {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// Change-quantity form data.
#[derive(Debug, Deserialize)]
pub struct ChangeQuantityBody {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct LineItemCreated {
    pub line_item_id: LineItemId,
}

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub deleted: u64,
}

/// Get the caller's trolley.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn get(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
) -> Result<Json<Vec<TrolleyLine>>> {
    let trolley = TrolleyRepository::new(state.pool());
    Ok(Json(trolley.get(caller.id).await?))
}

/// Add a product to the caller's trolley.
#[instrument(skip_all, fields(account_id = %caller.id, product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Json(body): Json<AddBody>,
) -> Result<(StatusCode, Json<LineItemCreated>)> {
    let trolley = TrolleyRepository::new(state.pool());
    let line_item_id = trolley.add(caller.id, body.product_id, body.quantity).await?;

    Ok((StatusCode::CREATED, Json(LineItemCreated { line_item_id })))
}

/// Set the quantity for a product already in the caller's trolley.
#[instrument(skip_all, fields(account_id = %caller.id, product_id = %body.product_id))]
pub async fn change_quantity(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Json(body): Json<ChangeQuantityBody>,
) -> Result<StatusCode> {
    let trolley = TrolleyRepository::new(state.pool());
    trolley
        .change_quantity(caller.id, body.product_id, body.quantity)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove one line item from the caller's trolley.
#[instrument(skip_all, fields(account_id = %caller.id, %line_item_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Path(line_item_id): Path<LineItemId>,
) -> Result<StatusCode> {
    let trolley = TrolleyRepository::new(state.pool());
    trolley.remove_line_item(caller.id, line_item_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Empty the caller's trolley.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
) -> Result<Json<Cleared>> {
    let trolley = TrolleyRepository::new(state.pool());
    let deleted = trolley.clear(caller.id).await?;

    Ok(Json(Cleared { deleted }))
}
