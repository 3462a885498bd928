//! # Application State
//!
//! Shared state handed to every handler through axum's `State` extractor.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  main.rs                                                                │
//! │    Database::new(config.db_config())                                    │
//! │    AppState::new(db, config.checkout_policy())                          │
//! │        .with_checkout_limits(config.checkout_limits())                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Router::with_state(state)  ── cloned per request ──► handlers           │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • Database wraps a SqlitePool (internally reference counted)           │
//! │  • CheckoutPolicy and CheckoutLimits are Copy, read-only after startup  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::{CheckoutLimits, CheckoutPolicy};
use storefront_db::Database;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Storage handle; cloning shares the underlying pool.
    pub db: Database,

    /// Skip/clamp or reject behaviour for checkouts.
    pub checkout_policy: CheckoutPolicy,

    /// Item-count and quantity caps per checkout request.
    pub checkout_limits: CheckoutLimits,
}

impl AppState {
    pub fn new(db: Database, checkout_policy: CheckoutPolicy) -> Self {
        AppState {
            db,
            checkout_policy,
            checkout_limits: CheckoutLimits::default(),
        }
    }

    pub fn with_checkout_limits(mut self, limits: CheckoutLimits) -> Self {
        self.checkout_limits = limits;
        self
    }
}
