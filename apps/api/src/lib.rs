//! # Storefront API
//!
//! axum HTTP server over the storefront database.
//!
//! ## Routes
//! ```text
//! GET     /                      liveness check
//! GET     /products[?search=]    list live products
//! POST    /products              create
//! GET     /products/:id          read
//! PUT     /products/:id          replace
//! DELETE  /products/:id          soft delete
//! GET     /categories            list live categories
//! POST    /categories            create
//! GET     /categories/:id        read
//! PUT     /categories/:id        replace
//! DELETE  /categories/:id        soft delete
//! POST    /checkouts             atomic checkout
//! GET     /checkouts/:id         recorded transaction
//! GET     /reports/today         today's sales (UTC)
//! GET     /reports               ?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD
//! ```
//!
//! The binary in `main.rs` wires configuration, tracing and shutdown around
//! [`build_router`]; tests drive the same router directly.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{category, checkout, health, product, report};

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router with every route and the request trace
/// layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::liveness))
        .route(
            "/products",
            get(product::list_products).post(product::create_product),
        )
        .route(
            "/products/:id",
            get(product::get_product)
                .put(product::update_product)
                .delete(product::delete_product),
        )
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        .route(
            "/categories/:id",
            get(category::get_category)
                .put(category::update_category)
                .delete(category::delete_category),
        )
        .route("/checkouts", post(checkout::create_checkout))
        .route("/checkouts/:id", get(checkout::get_checkout))
        .route("/reports/today", get(report::report_today))
        .route("/reports", get(report::report_range))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
