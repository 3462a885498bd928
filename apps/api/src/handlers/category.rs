//! # Category Handlers
//!
//! `GET/POST /categories`, `GET/PUT/DELETE /categories/:id`.
//!
//! Deleted categories behave as absent everywhere: they are not listed,
//! their id answers 404, and products referencing them show `category: null`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::handlers::StatusResponse;
use crate::state::AppState;
use storefront_core::{Category, CategoryDraft};

/// Category as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
    /// External identifier (UUID).
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        CategoryResponse {
            id: c.uuid,
            name: c.name,
            description: c.description,
        }
    }
}

/// Body of `POST /categories` and `PUT /categories/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CategoryRequest> for CategoryDraft {
    fn from(req: CategoryRequest) -> Self {
        CategoryDraft {
            name: req.name,
            description: req.description,
        }
    }
}

/// `GET /categories`
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = state.db.categories().list().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// `GET /categories/:id`
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = state
        .db
        .categories()
        .get_by_uuid(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &id))?;

    Ok(Json(category.into()))
}

/// `POST /categories`
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let category = state.db.categories().insert(&req.into()).await?;

    info!(uuid = %category.uuid, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// `PUT /categories/:id`
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<CategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    let category = state.db.categories().update(&id, &req.into()).await?;

    info!(uuid = %category.uuid, "Category updated");

    Ok(Json(category.into()))
}

/// `DELETE /categories/:id`
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    state.db.categories().soft_delete(&id).await?;

    info!(uuid = %id, "Category deleted");

    Ok(Json(StatusResponse::ok()))
}
