//! # Product Handlers
//!
//! `GET/POST /products`, `GET/PUT/DELETE /products/:id`.
//!
//! ## Search Flow
//! ```text
//! GET /products?search=cola
//!      │
//!      ▼
//! ProductRepository::list(Some("cola"))
//!      │  blank keyword  → no filter (full list)
//!      │  > 100 chars    → 400 VALIDATION_ERROR
//!      ▼
//! LIKE '%cola%' (case-insensitive)
//!      │
//!      ▼
//! Vec<ProductResponse>, ordered by key
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::handlers::category::CategoryResponse;
use crate::handlers::{price_to_cents, StatusResponse};
use crate::state::AppState;
use storefront_core::{Product, ProductDraft};

/// Product as returned to clients.
///
/// `stock: null` means inventory is not tracked; `price: null` means the
/// product has no price and sells at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    /// External identifier (UUID).
    pub id: String,
    pub sku: String,
    pub name: String,
    pub stock: Option<i64>,
    pub price: Option<f64>,
    pub category: Option<CategoryResponse>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            price: p.price().map(|m| m.to_major_f64()),
            id: p.uuid,
            sku: p.sku,
            name: p.name,
            stock: p.stock,
            category: p.category.map(Into::into),
        }
    }
}

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Category UUID.
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductRequest {
    fn into_draft(self) -> ApiResult<ProductDraft> {
        Ok(ProductDraft {
            price_cents: price_to_cents(self.price)?,
            sku: self.sku,
            name: self.name,
            stock: self.stock,
            category: self.category,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

/// `GET /products`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state.db.products().list(query.search.as_deref()).await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// `GET /products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .db
        .products()
        .get_by_uuid(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    Ok(Json(product.into()))
}

/// `POST /products`
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let draft = req.into_draft()?;
    let product = state.db.products().insert(&draft).await?;

    info!(uuid = %product.uuid, sku = %product.sku, "Product created");

    Ok((StatusCode::CREATED, Json(product.into())))
}

/// `PUT /products/:id`
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    let draft = req.into_draft()?;
    let product = state.db.products().update(&id, &draft).await?;

    info!(uuid = %product.uuid, sku = %product.sku, "Product updated");

    Ok(Json(product.into()))
}

/// `DELETE /products/:id`
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    state.db.products().soft_delete(&id).await?;

    info!(uuid = %id, "Product deleted");

    Ok(Json(StatusResponse::ok()))
}
