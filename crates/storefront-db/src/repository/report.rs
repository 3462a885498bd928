//! # Report Repository
//!
//! Read-only sales aggregates over a [`ReportWindow`].
//!
//! ## Queries
//! ```text
//! totals:       transactions in [from, until)
//!               → COUNT(*), SUM(total_cents)
//!
//! best seller:  transaction_details ⋈ transactions in [from, until)
//!               GROUP BY product_id
//!               ORDER BY SUM(quantity) DESC, product_id ASC   ← lowest key wins ties
//!               LIMIT 1
//! ```
//!
//! Products are joined regardless of `deleted_at`: a product deleted after
//! it sold still reports under its current name.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{BestSeller, ReportData, ReportWindow};

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Aggregates transaction count, revenue and best seller for `window`.
    pub async fn summarize(&self, window: ReportWindow) -> DbResult<ReportData> {
        let from = window.from_utc();
        let until = window.until_utc();

        debug!(%from, %until, "Building sales report");

        let (total_transaction, total_revenue_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM transactions
            WHERE transaction_at >= ?1 AND transaction_at < ?2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        if total_transaction == 0 {
            return Ok(ReportData::empty());
        }

        let best_seller: Option<BestSeller> = sqlx::query_as(
            r#"
            SELECT
                td.product_id AS product_id,
                MAX(td.product_uuid) AS product_uuid,
                COALESCE(MAX(p.name), MAX(td.product_name)) AS name,
                SUM(td.quantity) AS quantity
            FROM transaction_details td
            INNER JOIN transactions t ON t.id = td.transaction_id
            LEFT JOIN products p ON p.id = td.product_id
            WHERE t.transaction_at >= ?1 AND t.transaction_at < ?2
            GROUP BY td.product_id
            ORDER BY SUM(td.quantity) DESC, td.product_id ASC
            LIMIT 1
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ReportData {
            total_transaction,
            total_revenue_cents,
            best_seller,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
