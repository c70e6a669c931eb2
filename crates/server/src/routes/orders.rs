//! Order route handlers.
//!
//! Placing an order also writes its invoice and receipt documents. The
//! documents are JSON snapshots of the order at placement time, stored as
//! opaque payloads so later catalogue edits cannot rewrite history.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use awe_electronics_core::{AccountId, AddressId, OrderId};

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAccount;
use crate::models::{CurrentAccount, Order, OrderLine};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub address_id: AddressId,
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
}

/// The JSON document frozen into invoice and receipt payloads.
#[derive(Debug, Serialize)]
struct OrderDocument<'a> {
    kind: &'a str,
    order_id: OrderId,
    account_id: AccountId,
    lines: &'a [OrderLine],
    total: rust_decimal::Decimal,
}

/// An order with its frozen lines, as returned by `GET /orders/{id}`.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
    pub total: rust_decimal::Decimal,
}

/// Place an order from the caller's trolley.
#[instrument(skip_all, fields(account_id = %caller.id, address_id = %body.address_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<OrderCreated>)> {
    let orders = OrderRepository::new(state.pool());
    let order_id = orders.create_order(caller.id, body.address_id).await?;

    // Document writes happen after the commit. If one fails the order still
    // stands; the failure is reported and can be investigated from the log.
    if let Err(error) = write_documents(&orders, caller.id, order_id).await {
        tracing::error!(%order_id, %error, "failed to store order documents");
        sentry::capture_error(&error);
    }

    Ok((StatusCode::CREATED, Json(OrderCreated { order_id })))
}

async fn write_documents(
    orders: &OrderRepository<'_>,
    account_id: AccountId,
    order_id: OrderId,
) -> Result<()> {
    let lines = orders.get_order_items(order_id).await?;
    let total: rust_decimal::Decimal = lines
        .iter()
        .map(|l| l.price_at_sale * rust_decimal::Decimal::from(l.quantity))
        .sum();

    for kind in ["invoice", "receipt"] {
        let document = OrderDocument {
            kind,
            order_id,
            account_id,
            lines: &lines,
            total,
        };
        let payload =
            serde_json::to_vec(&document).map_err(|e| AppError::Internal(e.to_string()))?;
        if kind == "invoice" {
            orders.save_invoice(account_id, order_id, &payload).await?;
        } else {
            orders.save_receipt(account_id, order_id, &payload).await?;
        }
    }

    Ok(())
}

/// List the caller's orders, newest first.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool());
    Ok(Json(orders.get_orders(caller.id).await?))
}

/// Get one of the caller's orders with its frozen lines.
#[instrument(skip_all, fields(account_id = %caller.id, %order_id))]
pub async fn get(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let orders = OrderRepository::new(state.pool());
    let order = fetch_owned(&orders, &caller, order_id).await?;
    let items = orders.get_order_items(order_id).await?;
    let total = items
        .iter()
        .map(|l| l.price_at_sale * rust_decimal::Decimal::from(l.quantity))
        .sum();

    Ok(Json(OrderDetail {
        order,
        items,
        total,
    }))
}

/// Download the invoice document for one of the caller's orders.
#[instrument(skip_all, fields(account_id = %caller.id, %order_id))]
pub async fn invoice(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Path(order_id): Path<OrderId>,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    fetch_owned(&orders, &caller, order_id).await?;
    let invoice = orders
        .get_invoice(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("invoice".to_owned()))?;

    Ok(document_response(invoice.payload))
}

/// Download the receipt document for one of the caller's orders.
#[instrument(skip_all, fields(account_id = %caller.id, %order_id))]
pub async fn receipt(
    State(state): State<AppState>,
    RequireAccount(caller): RequireAccount,
    Path(order_id): Path<OrderId>,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    fetch_owned(&orders, &caller, order_id).await?;
    let receipt = orders
        .get_receipt(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("receipt".to_owned()))?;

    Ok(document_response(receipt.payload))
}

/// Fetch an order, hiding its existence from non-owning non-staff callers.
async fn fetch_owned(
    orders: &OrderRepository<'_>,
    caller: &CurrentAccount,
    order_id: OrderId,
) -> Result<Order> {
    let order = orders
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_owned()))?;
    if order.account_id != Some(caller.id) && !caller.role.is_staff() {
        return Err(AppError::NotFound("order".to_owned()));
    }

    Ok(order)
}

fn document_response(payload: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}
