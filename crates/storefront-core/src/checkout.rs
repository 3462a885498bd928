//! # Checkout Planning
//!
//! Turns a checkout request into the exact set of ledger lines and stock
//! decrements to persist. Pure: the database layer reads the product rows
//! inside its transaction, hands them here, then writes whatever plan comes
//! back.
//!
//! ## Planning Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items: [(sku_or_id, qty), ...]      snapshots: rows read in the tx     │
//! │       │                                     │                           │
//! │       ▼                                     │                           │
//! │  validate_request ── empty? ──► EmptyRequest                            │
//! │       │             > max_items? ──► TooManyItems                       │
//! │       │             qty < 1 ──► Validation                              │
//! │       │             qty > max_quantity ──► QuantityTooLarge             │
//! │       ▼                                     │                           │
//! │  for each item, in request order ◄──────────┘                           │
//! │       ├── no matching row      → skip   (Strict: UnresolvedItem)        │
//! │       ├── stock = NULL         → accept qty, no decrement               │
//! │       ├── remaining = 0        → skip   (Strict: InsufficientStock)     │
//! │       └── remaining > 0        → accept min(qty, remaining)             │
//! │                                  (Strict: short → InsufficientStock)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  no accepted lines? ──► NoProductsFound                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CheckoutPlan { lines, decrements (per product), total = Σ subtotal }   │
//! │       (any subtotal or the total past i64 cents ──► AmountOverflow)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same identifier may appear more than once. Each occurrence is its own
//! line, clamped against the stock left after the earlier lines, so the
//! per-product decrement never exceeds the stock that was read.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::StockSnapshot;
use crate::validation::{normalize_uuid, validate_quantity};
use crate::{MAX_CHECKOUT_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Limits
// =============================================================================

/// Per-request caps applied before any row is read.
///
/// Defaults are [`MAX_CHECKOUT_ITEMS`] and [`MAX_ITEM_QUANTITY`]; the API
/// overrides them from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutLimits {
    /// Most lines one request may carry.
    pub max_items: usize,
    /// Largest quantity on a single line.
    pub max_quantity: i64,
}

impl CheckoutLimits {
    pub const fn new(max_items: usize, max_quantity: i64) -> Self {
        CheckoutLimits {
            max_items,
            max_quantity,
        }
    }
}

impl Default for CheckoutLimits {
    fn default() -> Self {
        CheckoutLimits::new(MAX_CHECKOUT_ITEMS, MAX_ITEM_QUANTITY)
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// One requested line: a product UUID or SKU plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequestItem {
    pub sku_or_id: String,
    pub quantity: i64,
}

impl CheckoutRequestItem {
    pub fn new(sku_or_id: impl Into<String>, quantity: i64) -> Self {
        CheckoutRequestItem {
            sku_or_id: sku_or_id.into(),
            quantity,
        }
    }
}

/// How checkout treats items it cannot fully honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPolicy {
    /// Skip unknown and sold-out items, clamp short ones.
    #[default]
    Lenient,
    /// Reject the whole checkout instead of skipping or clamping.
    Strict,
}

// =============================================================================
// Plan Types
// =============================================================================

/// An accepted line, ready to become a `TransactionDetail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub product_uuid: String,
    pub product_sku: String,
    pub product_name: String,
    pub unit_price: Money,
    /// Effective quantity after clamping.
    pub quantity: i64,
    pub subtotal: Money,
}

/// Total units to take off one tracked product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: i64,
    pub sku: String,
    pub quantity: i64,
}

/// Why a lenient checkout dropped an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unresolved,
    OutOfStock,
}

/// A requested item that produced no line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub sku_or_id: String,
    pub reason: SkipReason,
}

/// Everything the ledger write needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    /// Accepted lines in request order.
    pub lines: Vec<PlannedLine>,
    /// One entry per tracked product, in first-seen order.
    pub decrements: Vec<StockDecrement>,
    /// Items dropped under the lenient policy.
    pub skipped: Vec<SkippedItem>,
    /// Always `Σ lines[..].subtotal`.
    pub total: Money,
}

// =============================================================================
// Validation
// =============================================================================

/// Rejects requests that are malformed regardless of stock.
pub fn validate_request(items: &[CheckoutRequestItem], limits: &CheckoutLimits) -> CoreResult<()> {
    validate_items(items)?;

    if items.len() > limits.max_items {
        return Err(CoreError::TooManyItems {
            max: limits.max_items,
        });
    }

    if let Some(item) = items.iter().find(|i| i.quantity > limits.max_quantity) {
        return Err(CoreError::QuantityTooLarge {
            requested: item.quantity,
            max: limits.max_quantity,
        });
    }

    Ok(())
}

/// Non-empty, every quantity positive. Holds under any limits.
fn validate_items(items: &[CheckoutRequestItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyRequest);
    }

    for item in items {
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

/// The distinct identifiers to resolve in one batch lookup.
///
/// Identifiers that parse as UUIDs are also returned in canonical form so a
/// differently-cased UUID still matches the stored one.
pub fn lookup_keys(items: &[CheckoutRequestItem]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(items.len());

    for item in items {
        let raw = item.sku_or_id.trim();
        if !keys.iter().any(|k| k == raw) {
            keys.push(raw.to_string());
        }
        if let Some(canonical) = normalize_uuid(raw) {
            if !keys.contains(&canonical) {
                keys.push(canonical);
            }
        }
    }

    keys
}

// =============================================================================
// Planning
// =============================================================================

/// Builds the checkout plan from the rows read inside the transaction.
///
/// Request limits are the caller's job ([`validate_request`]); planning only
/// re-checks that the request is non-empty with positive quantities.
///
/// ## Example
/// ```rust
/// use storefront_core::checkout::{plan_checkout, CheckoutPolicy, CheckoutRequestItem};
/// use storefront_core::types::StockSnapshot;
///
/// let rows = vec![StockSnapshot {
///     product_id: 1,
///     uuid: "0b6b0c4e-7a44-4a0e-9a53-3c6f1b0a2d11".into(),
///     sku: "A".into(),
///     name: "Alpha".into(),
///     stock: Some(5),
///     price_cents: Some(1000),
/// }];
///
/// let plan = plan_checkout(&[CheckoutRequestItem::new("A", 8)], &rows, CheckoutPolicy::Lenient).unwrap();
/// assert_eq!(plan.lines[0].quantity, 5);
/// assert_eq!(plan.total.cents(), 5000);
/// ```
pub fn plan_checkout(
    items: &[CheckoutRequestItem],
    snapshots: &[StockSnapshot],
    policy: CheckoutPolicy,
) -> CoreResult<CheckoutPlan> {
    validate_items(items)?;

    let mut remaining: HashMap<i64, Option<i64>> = snapshots
        .iter()
        .map(|s| (s.product_id, s.stock))
        .collect();

    let mut lines = Vec::new();
    let mut decrements: Vec<StockDecrement> = Vec::new();
    let mut skipped = Vec::new();
    let mut total = Money::zero();

    for item in items {
        let Some(product) = resolve(&item.sku_or_id, snapshots) else {
            if policy == CheckoutPolicy::Strict {
                return Err(CoreError::UnresolvedItem(item.sku_or_id.clone()));
            }
            skipped.push(SkippedItem {
                sku_or_id: item.sku_or_id.clone(),
                reason: SkipReason::Unresolved,
            });
            continue;
        };

        let available = remaining.get(&product.product_id).copied().flatten();

        let quantity = match available {
            None => item.quantity,
            Some(left) if left <= 0 || (policy == CheckoutPolicy::Strict && left < item.quantity) => {
                if policy == CheckoutPolicy::Strict {
                    return Err(CoreError::InsufficientStock {
                        sku: product.sku.clone(),
                        available: left.max(0),
                        requested: item.quantity,
                    });
                }
                skipped.push(SkippedItem {
                    sku_or_id: item.sku_or_id.clone(),
                    reason: SkipReason::OutOfStock,
                });
                continue;
            }
            Some(left) => {
                let take = item.quantity.min(left);
                remaining.insert(product.product_id, Some(left - take));

                match decrements
                    .iter_mut()
                    .find(|d| d.product_id == product.product_id)
                {
                    Some(existing) => existing.quantity += take,
                    None => decrements.push(StockDecrement {
                        product_id: product.product_id,
                        sku: product.sku.clone(),
                        quantity: take,
                    }),
                }
                take
            }
        };

        let unit_price = product.unit_price();
        let subtotal = unit_price
            .checked_multiply_quantity(quantity)
            .ok_or(CoreError::AmountOverflow)?;
        total = total.checked_add(subtotal).ok_or(CoreError::AmountOverflow)?;

        lines.push(PlannedLine {
            product_id: product.product_id,
            product_uuid: product.uuid.clone(),
            product_sku: product.sku.clone(),
            product_name: product.name.clone(),
            unit_price,
            quantity,
            subtotal,
        });
    }

    if lines.is_empty() {
        return Err(CoreError::NoProductsFound);
    }

    Ok(CheckoutPlan {
        lines,
        decrements,
        skipped,
        total,
    })
}

/// UUID match wins over SKU match.
fn resolve<'a>(sku_or_id: &str, snapshots: &'a [StockSnapshot]) -> Option<&'a StockSnapshot> {
    let raw = sku_or_id.trim();

    if let Some(canonical) = normalize_uuid(raw) {
        if let Some(found) = snapshots.iter().find(|s| s.uuid == canonical) {
            return Some(found);
        }
    }

    snapshots.iter().find(|s| s.sku == raw)
}

// =============================================================================
// Unit Tests
// =============================================================================
