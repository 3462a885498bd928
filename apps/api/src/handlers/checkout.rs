//! # Checkout Handlers
//!
//! `POST /checkouts` runs the atomic checkout; `GET /checkouts/:id` reads a
//! recorded transaction back in the same shape.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /checkouts {"items":[{"sku_or_id":"A","quantity":3}, ...]}        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkouts().with_limits(state.checkout_limits)                         │
//! │      .checkout(items, state.checkout_policy)                            │
//! │       │   one sqlx transaction: resolve → plan → decrement → ledger     │
//! │       │                                                                 │
//! │       ├── Err(EmptyRequest / NoProductsFound / ...) ──► 400, no writes  │
//! │       ├── Err(TooManyItems / QuantityTooLarge) ───────► 400, no writes  │
//! │       ├── Err(AmountOverflow) ────────────────────────► 400, no writes  │
//! │       ├── Err(StockConflict) ─────────────────────────► 409, no writes  │
//! │       ▼                                                                 │
//! │  201 { id, date, total_amount, items: [...] }                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;
use storefront_core::validation::REPORT_DATE_FORMAT;
use storefront_core::{CheckoutRequestItem, Transaction, TransactionDetail};

/// Body of `POST /checkouts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutRequestItem>,
}

/// A recorded transaction as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Transaction UUID.
    pub id: String,
    /// Transaction day, `YYYY-MM-DD` (UTC).
    pub date: String,
    pub total_amount: f64,
    pub items: Vec<CheckoutItemResponse>,
}

/// One transaction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutItemResponse {
    /// Product UUID at checkout time.
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl From<TransactionDetail> for CheckoutItemResponse {
    fn from(d: TransactionDetail) -> Self {
        CheckoutItemResponse {
            unit_price: d.unit_price().to_major_f64(),
            total_price: d.subtotal().to_major_f64(),
            product_id: d.product_uuid,
            product_name: d.product_name,
            quantity: d.quantity,
        }
    }
}

impl From<Transaction> for CheckoutResponse {
    fn from(t: Transaction) -> Self {
        CheckoutResponse {
            date: t
                .transaction_at
                .date_naive()
                .format(REPORT_DATE_FORMAT)
                .to_string(),
            total_amount: t.total().to_major_f64(),
            id: t.uuid,
            items: t.details.into_iter().map(Into::into).collect(),
        }
    }
}

/// `POST /checkouts`
pub async fn create_checkout(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let transaction = state
        .db
        .checkouts()
        .with_limits(state.checkout_limits)
        .checkout(&req.items, state.checkout_policy)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// `GET /checkouts/:id`
pub async fn get_checkout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CheckoutResponse>> {
    let transaction = state
        .db
        .checkouts()
        .get_by_uuid(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Transaction", &id))?;

    Ok(Json(transaction.into()))
}
