//! # Domain Types
//!
//! Core domain types used throughout Storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Product      │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  uuid           │   │  uuid, sku      │   │  uuid           │       │
//! │  │  name           │   │  stock?         │   │  total_cents    │       │
//! │  │  description?   │   │  price_cents?   │   │  transaction_at │       │
//! │  └─────────────────┘   └────────▲────────┘   └────────┬────────┘       │
//! │                                 │ product_id          │ 1..n           │
//! │                        ┌────────┴─────────────────────▼────────┐       │
//! │                        │          TransactionDetail            │       │
//! │                        │  price/name/sku frozen at checkout    │       │
//! │                        └───────────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: auto-assigned integer key, used for database relations, never
//!   exposed over HTTP
//! - `uuid`: UUID v4, the only identifier callers ever see
//!
//! Products additionally carry a `sku`, a short human code that checkout
//! accepts in place of the UUID.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_category_name, validate_description, validate_price_cents, validate_product_name,
    validate_sku, validate_stock,
};

// =============================================================================
// Category
// =============================================================================

/// A product grouping. Soft-deleted through `deleted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `category` is populated by reads that join the category table; it is
/// `None` both when the product has no category and when the referenced
/// category has been soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Internal key (auto-assigned, never reused).
    pub id: i64,

    /// External identifier (UUID v4).
    pub uuid: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Units on hand. `None` means inventory is not tracked.
    pub stock: Option<i64>,

    /// Price in cents. `None` sells at zero.
    pub price_cents: Option<i64>,

    /// Internal key of the referenced category, if any.
    pub category_id: Option<i64>,

    /// Joined category (live categories only).
    pub category: Option<Category>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as Money, if set.
    #[inline]
    pub fn price(&self) -> Option<Money> {
        self.price_cents.map(Money::from_cents)
    }

    /// Price charged at checkout: a missing price sells at zero.
    #[inline]
    pub fn unit_price(&self) -> Money {
        self.price().unwrap_or_default()
    }
}

// =============================================================================
// Write Inputs
// =============================================================================

/// Fields accepted when creating or replacing a product.
///
/// `category` is the external UUID of a live category; blank means none.
/// `sku` is optional: on create a random one is generated, on update the
/// stored SKU is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub sku: Option<String>,
    pub name: String,
    pub stock: Option<i64>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
}

impl ProductDraft {
    /// Runs every field rule; the first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(sku) = &self.sku {
            validate_sku(sku)?;
        }
        validate_product_name(&self.name)?;
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        if let Some(price) = self.price_cents {
            validate_price_cents(price)?;
        }
        Ok(())
    }

    /// The category reference, ignoring blank strings.
    pub fn category_ref(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Fields accepted when creating or replacing a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_category_name(&self.name)?;
        validate_description(self.description.as_deref())
    }
}

// =============================================================================
// Stock Snapshot
// =============================================================================

/// The slice of a product row the checkout engine needs, read inside the
/// checkout transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockSnapshot {
    #[cfg_attr(feature = "sqlx", sqlx(rename = "id"))]
    pub product_id: i64,
    pub uuid: String,
    pub sku: String,
    pub name: String,
    pub stock: Option<i64>,
    pub price_cents: Option<i64>,
}

impl StockSnapshot {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_cents.unwrap_or(0))
    }
}

// =============================================================================
// Transaction (Ledger Header)
// =============================================================================

/// A recorded checkout. Created exactly once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    pub uuid: String,
    /// Always equals the sum of `details[..].subtotal_cents`.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub transaction_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Detail (Ledger Line)
// =============================================================================

/// A line of a transaction.
/// Uses snapshot pattern to freeze product data at time of checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionDetail {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    /// Product UUID at time of checkout (frozen).
    pub product_uuid: String,
    /// SKU at time of checkout (frozen).
    pub product_sku: String,
    /// Product name at time of checkout (frozen).
    pub product_name: String,
    /// Unit price in cents at time of checkout (frozen).
    pub price_cents: i64,
    pub quantity: i64,
    /// price_cents × quantity.
    pub subtotal_cents: i64,
}

impl TransactionDetail {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Aggregated sales figures over a [`ReportWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportData {
    pub total_transaction: i64,
    pub total_revenue_cents: i64,
    /// `None` when the window holds no transactions.
    pub best_seller: Option<BestSeller>,
}

impl ReportData {
    pub fn empty() -> Self {
        ReportData {
            total_transaction: 0,
            total_revenue_cents: 0,
            best_seller: None,
        }
    }

    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }
}

/// The product with the highest quantity sold in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BestSeller {
    pub product_id: i64,
    pub product_uuid: String,
    pub name: String,
    pub quantity: i64,
}

/// An inclusive range of calendar days (UTC).
///
/// ## Bounds
/// ```text
/// start = 2024-03-01, end = 2024-03-02
///
///   [2024-03-01T00:00:00Z ─────────────────────── 2024-03-03T00:00:00Z)
///    ▲ inclusive                                   ▲ exclusive
///
/// The whole of the end day is covered without any 23:59:59 arithmetic.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportWindow {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Builds a window. The caller is responsible for `start <= end`
    /// (see [`crate::validation::validate_date_range`]).
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        ReportWindow { start, end }
    }

    /// A window covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        ReportWindow::new(date, date)
    }

    /// Inclusive lower bound: midnight at the start of `start`.
    pub fn from_utc(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Exclusive upper bound: midnight after `end`.
    pub fn until_utc(&self) -> DateTime<Utc> {
        (self.end.and_time(NaiveTime::MIN) + Duration::days(1)).and_utc()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
