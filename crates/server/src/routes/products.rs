//! Product catalogue route handlers.
//!
//! Reads are public; writes require staff.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use awe_electronics_core::{ImageId, ProductId, TagId};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::services::catalogue::{self, PriceOrder};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive substring search over name, description, and tags.
    pub search: Option<String>,
    /// Comma-separated tag names; products must carry all of them.
    pub tags: Option<String>,
    /// Only products that can currently be sold.
    #[serde(default)]
    pub available: bool,
    /// Sort by price when present.
    pub sort: Option<PriceOrder>,
}

#[derive(Debug, Serialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct TagBody {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TagCreated {
    pub tag_id: TagId,
}

#[derive(Debug, Deserialize)]
pub struct ImageBody {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ImageCreated {
    pub image_id: ImageId,
}

/// List the catalogue with optional search, tag, availability, and price
/// sort parameters.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool());

    let mut results = match &query.tags {
        Some(tags) => {
            let names: Vec<String> = tags
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            products.get_by_tags(&names).await?
        }
        None => products.get_all().await?,
    };

    if let Some(term) = &query.search {
        results = catalogue::search(results, term);
    }
    if query.available {
        results = catalogue::filter_available(results);
    }
    if let Some(order) = query.sort {
        results = catalogue::sort_by_price(results, order);
    }

    Ok(Json(results))
}

/// Get a single product.
#[instrument(skip_all, fields(%product_id))]
pub async fn get(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    Ok(Json(product))
}

/// Create a product. Staff only.
#[instrument(skip_all, fields(account_id = %caller.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductCreated>)> {
    let products = ProductRepository::new(state.pool());
    let product_id = products.create(&body).await?;

    tracing::info!(%product_id, "product created");

    Ok((StatusCode::CREATED, Json(ProductCreated { product_id })))
}

/// Update product fields. Staff only.
#[instrument(skip_all, fields(account_id = %caller.id, %product_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
    Path(product_id): Path<ProductId>,
    Json(body): Json<ProductUpdate>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.pool());
    products.update(product_id, &body).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Attach a tag to a product. Staff only.
#[instrument(skip_all, fields(account_id = %caller.id, %product_id))]
pub async fn add_tag(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
    Path(product_id): Path<ProductId>,
    Json(body): Json<TagBody>,
) -> Result<(StatusCode, Json<TagCreated>)> {
    let products = ProductRepository::new(state.pool());
    let tag_id = products.add_tag(product_id, &body.name).await?;

    Ok((StatusCode::CREATED, Json(TagCreated { tag_id })))
}

/// Detach a tag from a product. Staff only.
#[instrument(skip_all, fields(account_id = %caller.id, %product_id, tag = %tag_name))]
pub async fn remove_tag(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
    Path((product_id, tag_name)): Path<(ProductId, String)>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.pool());
    products.remove_tag(product_id, &tag_name).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image URL to a product. Staff only.
#[instrument(skip_all, fields(account_id = %caller.id, %product_id))]
pub async fn add_image(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
    Path(product_id): Path<ProductId>,
    Json(body): Json<ImageBody>,
) -> Result<(StatusCode, Json<ImageCreated>)> {
    let products = ProductRepository::new(state.pool());
    let image_id = products.add_image(product_id, &body.url).await?;

    Ok((StatusCode::CREATED, Json(ImageCreated { image_id })))
}

/// Detach and delete a product image. Staff only.
#[instrument(skip_all, fields(account_id = %caller.id, %product_id, %image_id))]
pub async fn remove_image(
    State(state): State<AppState>,
    RequireStaff(caller): RequireStaff,
    Path((product_id, image_id)): Path<(ProductId, ImageId)>,
) -> Result<StatusCode> {
    let products = ProductRepository::new(state.pool());
    products.remove_image(product_id, image_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
