//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  HTTP API errors (apps/api)                                            │
//! │  └── ApiError         - Status code + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a tag the API layer maps by identity; nothing downstream
//! inspects the rendered message.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout request carried no items.
    #[error("Checkout request has no items")]
    EmptyRequest,

    /// None of the requested items resolved to a live, in-stock product.
    ///
    /// ## When This Occurs
    /// ```text
    /// items: [GHOST-1 ×2, SOLDOUT ×1]
    ///      │
    ///      ▼
    /// GHOST-1 unresolved → skipped
    /// SOLDOUT stock = 0  → skipped
    ///      │
    ///      ▼
    /// accepted lines = 0 → NoProductsFound
    /// ```
    #[error("No products found for checkout")]
    NoProductsFound,

    /// A write referenced a category that does not exist or was deleted.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Strict checkout: an identifier did not resolve to a product.
    #[error("Checkout item does not match any product: {0}")]
    UnresolvedItem(String),

    /// Strict checkout: not enough stock to honour the requested quantity.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// The guarded stock decrement affected no row: stock moved underneath
    /// the checkout and the whole transaction is rolled back.
    #[error("Stock for {sku} changed during checkout")]
    StockConflict { sku: String },

    /// Checkout has more lines than allowed.
    #[error("Checkout cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line subtotal or the checkout total does not fit in `i64` cents.
    #[error("Checkout total exceeds the supported amount")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
