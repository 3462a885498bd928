//! # storefront-core: Pure Business Logic for Storefront
//!
//! This crate holds the business rules of the storefront backend as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │   /products  /categories  /checkouts  /reports                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   plan    │  │   rules   │  │   │
//! │  │   │  Category │  │  (cents)  │  │  clamp    │  │  uuid/sku │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                storefront-db (Database Layer)                   │   │
//! │  │        SQLite queries, migrations, repositories, ledger         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, ReportData)
//! - [`money`] - Money type with integer arithmetic
//! - [`checkout`] - Checkout planning: resolve, clamp, total
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_cents(1000); // 10.00
//! let line = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line.cents(), 3000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{
    CheckoutLimits, CheckoutPlan, CheckoutPolicy, CheckoutRequestItem, PlannedLine, SkipReason,
    SkippedItem, StockDecrement,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default cap on lines in a single checkout request.
pub const MAX_CHECKOUT_ITEMS: usize = 100;

/// Default cap on the requested quantity of a single checkout line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted product price in cents (1,000,000.00).
///
/// With [`MAX_ITEM_QUANTITY`] and [`MAX_CHECKOUT_ITEMS`] at their defaults a
/// checkout total stays below 10^13 cents, far from `i64::MAX`.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Prefix of server-generated SKUs.
pub const GENERATED_SKU_PREFIX: &str = "ITEM-";
