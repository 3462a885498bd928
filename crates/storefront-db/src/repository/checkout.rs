//! # Checkout Repository
//!
//! The ledger write: one checkout, one database transaction.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_request against CheckoutLimits (no I/O)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE ───────────────────────────────────────────────────┐   │
//! │  │  resolve_stock        SELECT ... WHERE uuid IN (..) OR sku IN (..)│   │
//! │  │  plan_checkout        skip / clamp / total (storefront-core)      │   │
//! │  │  for each decrement:                                              │   │
//! │  │      UPDATE products SET stock = stock - q                        │   │
//! │  │      WHERE id = ? AND stock >= q       ── 0 rows? StockConflict   │   │
//! │  │  INSERT transactions (uuid, total, at)  → transaction_id          │   │
//! │  │  INSERT transaction_details × n                                   │   │
//! │  COMMIT ◄───────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  BEGIN IMMEDIATE takes the write lock before the first read. Concurrent │
//! │  checkouts queue on it (up to busy_timeout) instead of failing with     │
//! │  SQLITE_BUSY when a deferred read lock cannot be upgraded.              │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the sqlx::Transaction, which rolls back.   │
//! │  Dropping the future (client went away) does the same.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::resolve_stock;
use storefront_core::checkout::{lookup_keys, plan_checkout, validate_request};
use storefront_core::validation::normalize_uuid;
use storefront_core::{
    CheckoutLimits, CheckoutPlan, CheckoutPolicy, CheckoutRequestItem, CoreError, Transaction,
    TransactionDetail,
};

const DETAIL_COLUMNS: &str = "id, transaction_id, product_id, product_uuid, product_sku, \
                              product_name, price_cents, quantity, subtotal_cents";

/// Repository for checkouts and the transaction ledger.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
    limits: CheckoutLimits,
}

impl CheckoutRepository {
    /// Creates a new CheckoutRepository with default request limits.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository {
            pool,
            limits: CheckoutLimits::default(),
        }
    }

    /// Replaces the per-request item and quantity caps.
    pub fn with_limits(mut self, limits: CheckoutLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Runs a checkout stamped with the current time.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - The recorded transaction with its details
    /// * `Err(DbError::Domain(..))` - `EmptyRequest`, `NoProductsFound`,
    ///   strict-mode rejections, `StockConflict`; nothing was written
    /// * `Err(..)` - Storage failure; nothing was written
    pub async fn checkout(
        &self,
        items: &[CheckoutRequestItem],
        policy: CheckoutPolicy,
    ) -> DbResult<Transaction> {
        self.checkout_at(items, policy, Utc::now()).await
    }

    /// Runs a checkout stamped with `at`.
    pub async fn checkout_at(
        &self,
        items: &[CheckoutRequestItem],
        policy: CheckoutPolicy,
        at: DateTime<Utc>,
    ) -> DbResult<Transaction> {
        validate_request(items, &self.limits)?;

        debug!(items = items.len(), ?policy, "Starting checkout");

        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let snapshots = resolve_stock(&mut tx, &lookup_keys(items)).await?;
        let plan = plan_checkout(items, &snapshots, policy)?;

        for skipped in &plan.skipped {
            warn!(
                sku_or_id = %skipped.sku_or_id,
                reason = ?skipped.reason,
                "Skipping checkout item"
            );
        }

        apply_decrements(&mut tx, &plan, at).await?;
        let transaction = write_ledger(&mut tx, &plan, at).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            uuid = %transaction.uuid,
            lines = transaction.details.len(),
            total = %plan.total,
            "Checkout recorded"
        );

        Ok(transaction)
    }

    /// Gets a recorded transaction with its details by external id.
    ///
    /// ## Returns
    /// * `Ok(None)` - Unknown or malformed id
    pub async fn get_by_uuid(&self, id: &str) -> DbResult<Option<Transaction>> {
        let Some(uuid) = normalize_uuid(id) else {
            return Ok(None);
        };

        let header: Option<Transaction> = sqlx::query_as(
            "SELECT id, uuid, total_cents, transaction_at FROM transactions WHERE uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut transaction) = header else {
            return Ok(None);
        };

        transaction.details = sqlx::query_as::<_, TransactionDetail>(&format!(
            "SELECT {DETAIL_COLUMNS} FROM transaction_details WHERE transaction_id = ? ORDER BY id"
        ))
        .bind(transaction.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(transaction))
    }
}

/// Guarded decrements: a row only changes if it still holds enough stock.
async fn apply_decrements(
    conn: &mut SqliteConnection,
    plan: &CheckoutPlan,
    at: DateTime<Utc>,
) -> DbResult<()> {
    for decrement in &plan.decrements {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1
              AND deleted_at IS NULL
              AND stock IS NOT NULL
              AND stock >= ?2
            "#,
        )
        .bind(decrement.product_id)
        .bind(decrement.quantity)
        .bind(at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            warn!(sku = %decrement.sku, quantity = decrement.quantity, "Stock moved during checkout");
            return Err(CoreError::StockConflict {
                sku: decrement.sku.clone(),
            }
            .into());
        }

        debug!(sku = %decrement.sku, quantity = decrement.quantity, "Stock decremented");
    }

    Ok(())
}

/// Inserts the header, then one detail per planned line.
async fn write_ledger(
    conn: &mut SqliteConnection,
    plan: &CheckoutPlan,
    at: DateTime<Utc>,
) -> DbResult<Transaction> {
    let uuid = Uuid::new_v4().to_string();

    let header = sqlx::query(
        "INSERT INTO transactions (uuid, total_cents, transaction_at) VALUES (?1, ?2, ?3)",
    )
    .bind(&uuid)
    .bind(plan.total.cents())
    .bind(at)
    .execute(&mut *conn)
    .await?;

    let transaction_id = header.last_insert_rowid();
    let mut details = Vec::with_capacity(plan.lines.len());

    for line in &plan.lines {
        let result = sqlx::query(
            r#"
            INSERT INTO transaction_details (
                transaction_id, product_id, product_uuid, product_sku, product_name,
                price_cents, quantity, subtotal_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(transaction_id)
        .bind(line.product_id)
        .bind(&line.product_uuid)
        .bind(&line.product_sku)
        .bind(&line.product_name)
        .bind(line.unit_price.cents())
        .bind(line.quantity)
        .bind(line.subtotal.cents())
        .execute(&mut *conn)
        .await?;

        details.push(TransactionDetail {
            id: result.last_insert_rowid(),
            transaction_id,
            product_id: line.product_id,
            product_uuid: line.product_uuid.clone(),
            product_sku: line.product_sku.clone(),
            product_name: line.product_name.clone(),
            price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            subtotal_cents: line.subtotal.cents(),
        });
    }

    Ok(Transaction {
        id: transaction_id,
        uuid,
        total_cents: plan.total.cents(),
        transaction_at: at,
        details,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
