//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Storefront                             │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                           │
//! │         │                                                               │
//! │         ├── DbError::NotFound ───────────────► 404 NOT_FOUND            │
//! │         ├── DbError::UniqueViolation ────────► 400 DUPLICATE            │
//! │         ├── DbError::Domain(CoreError) ──┐                              │
//! │         │                                ▼                              │
//! │         ├── CoreError::Validation ───────────► 400 VALIDATION_ERROR     │
//! │         ├── CoreError::EmptyRequest ─────────► 400 EMPTY_REQUEST        │
//! │         ├── CoreError::NoProductsFound ──────► 400 NO_PRODUCTS_FOUND    │
//! │         ├── CoreError::AmountOverflow ───────► 400 AMOUNT_OVERFLOW      │
//! │         ├── CoreError::StockConflict ────────► 409 STOCK_CONFLICT       │
//! │         ├── malformed JSON body ─────────────► 400 VALIDATION_ERROR     │
//! │         └── DbError::is_internal ── logged ──► 500 DATABASE_ERROR       │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Product not found: ..." }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mapping is by variant only. Storage faults are logged with their detail
//! and reach the client as a generic message.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use storefront_core::{CoreError, ValidationError};
use storefront_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 6f1c2a4e-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource in the path not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Unique field already taken (400)
    Duplicate,

    /// Referenced category missing or deleted (400)
    CategoryNotFound,

    /// Checkout without items (400)
    EmptyRequest,

    /// Checkout where nothing resolved to a sellable product (400)
    NoProductsFound,

    /// Strict checkout: unknown identifier (400)
    UnresolvedItem,

    /// Strict checkout: not enough stock (400)
    InsufficientStock,

    /// Checkout total does not fit the ledger's amount range (400)
    AmountOverflow,

    /// Stock changed while the checkout ran (409)
    StockConflict,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError
            | ErrorCode::Duplicate
            | ErrorCode::CategoryNotFound
            | ErrorCode::EmptyRequest
            | ErrorCode::NoProductsFound
            | ErrorCode::UnresolvedItem
            | ErrorCode::InsufficientStock
            | ErrorCode::AmountOverflow => StatusCode::BAD_REQUEST,
            ErrorCode::StockConflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_internal() {
            tracing::error!(error = %err, "Database failure");
            return ApiError::new(ErrorCode::DatabaseError, storage_message(&err));
        }

        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Domain(core) => core.into(),
            other => ApiError::new(ErrorCode::DatabaseError, storage_message(&other)),
        }
    }
}

/// Client-facing text for a storage fault. The detail only goes to the log.
fn storage_message(err: &DbError) -> &'static str {
    match err {
        DbError::ConnectionFailed(_) => "Database connection failed",
        DbError::MigrationFailed(_) => "Database migration failed",
        DbError::TransactionFailed(_) => "Database transaction failed",
        DbError::PoolExhausted => "Database is busy",
        _ => "Database operation failed",
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::EmptyRequest => ErrorCode::EmptyRequest,
            CoreError::NoProductsFound => ErrorCode::NoProductsFound,
            CoreError::CategoryNotFound(_) => ErrorCode::CategoryNotFound,
            CoreError::UnresolvedItem(_) => ErrorCode::UnresolvedItem,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::StockConflict { .. } => ErrorCode::StockConflict,
            CoreError::AmountOverflow => ErrorCode::AmountOverflow,
            CoreError::TooManyItems { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        let message = match err {
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };

        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or missing JSON bodies.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// `axum::Json` whose rejection is an [`ApiError`], so a bad body gets the
/// same `{code, message}` shape as every other failure.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_404() {
        let err: ApiError = DbError::not_found("Product", "abc").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Product not found: abc");
    }

    #[test]
    fn test_checkout_rule_errors_are_400() {
        for core in [
            CoreError::EmptyRequest,
            CoreError::NoProductsFound,
            CoreError::CategoryNotFound("x".to_string()),
            CoreError::UnresolvedItem("x".to_string()),
        ] {
            let err: ApiError = DbError::Domain(core).into();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_duplicate_is_400() {
        let err: ApiError = DbError::duplicate("sku", "COKE").into();
        assert_eq!(err.code, ErrorCode::Duplicate);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_stock_conflict_is_409() {
        let err: ApiError = CoreError::StockConflict {
            sku: "A".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err: ApiError = DbError::QueryFailed("no such table: secrets".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("secrets"));
    }

    #[test]
    fn test_pool_exhaustion_reads_busy() {
        let err: ApiError = DbError::PoolExhausted.into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database is busy");
    }

    #[test]
    fn test_amount_overflow_is_400() {
        let err: ApiError = DbError::Domain(CoreError::AmountOverflow).into();
        assert_eq!(err.code, ErrorCode::AmountOverflow);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&err).unwrap()["code"],
            "AMOUNT_OVERFLOW"
        );
    }

    #[test]
    fn test_validation_message_is_unwrapped() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "name is required");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Category", "1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Category not found: 1");
    }
}
