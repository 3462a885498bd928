//! # Report Handlers
//!
//! `GET /reports/today` and `GET /reports?start_date=&end_date=`.
//!
//! Days are UTC calendar days; `end_date` is inclusive.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;
use storefront_core::validation::{parse_report_date, validate_date_range};
use storefront_core::{ReportData, ReportWindow, ValidationError};

/// Sales summary as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub total_revenue: f64,
    pub total_transaction: i64,
    pub most_purchased_item: MostPurchasedItem,
}

/// Best seller of the window. All fields empty/zero when nothing sold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MostPurchasedItem {
    /// Product UUID.
    pub id: String,
    pub name: String,
    pub quantity: i64,
}

impl From<ReportData> for ReportResponse {
    fn from(r: ReportData) -> Self {
        ReportResponse {
            total_revenue: r.total_revenue().to_major_f64(),
            total_transaction: r.total_transaction,
            most_purchased_item: r
                .best_seller
                .map(|b| MostPurchasedItem {
                    id: b.product_uuid,
                    name: b.name,
                    quantity: b.quantity,
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReportQuery {
    fn window(&self) -> Result<ReportWindow, ValidationError> {
        let start = required_date("start_date", self.start_date.as_deref())?;
        let end = required_date("end_date", self.end_date.as_deref())?;
        validate_date_range(start, end)?;
        Ok(ReportWindow::new(start, end))
    }
}

fn required_date(field: &str, value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    match value {
        Some(v) => parse_report_date(field, v),
        None => Err(ValidationError::Required {
            field: field.to_string(),
        }),
    }
}

/// `GET /reports/today`
pub async fn report_today(State(state): State<AppState>) -> ApiResult<Json<ReportResponse>> {
    let today = Utc::now().date_naive();
    let report = state.db.reports().summarize(ReportWindow::day(today)).await?;
    Ok(Json(report.into()))
}

/// `GET /reports`
pub async fn report_range(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<ReportResponse>> {
    let window = query.window()?;

    debug!(start = %window.start, end = %window.end, "Report requested");

    let report = state.db.reports().summarize(window).await?;
    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::BestSeller;

    fn query(start: Option<&str>, end: Option<&str>) -> ReportQuery {
        ReportQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn test_window_parsing() {
        let window = query(Some("2024-03-01"), Some("2024-03-02")).window().unwrap();
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_window_rejects_bad_input() {
        assert!(query(None, Some("2024-03-02")).window().is_err());
        assert!(query(Some("2024-03-01"), None).window().is_err());
        assert!(query(Some("03/01/2024"), Some("2024-03-02")).window().is_err());
        assert!(query(Some("2024-03-05"), Some("2024-03-02")).window().is_err());
    }

    #[test]
    fn test_empty_report_projection() {
        let response = ReportResponse::from(ReportData::empty());
        assert_eq!(response.total_revenue, 0.0);
        assert_eq!(response.total_transaction, 0);
        assert_eq!(response.most_purchased_item, MostPurchasedItem::default());
    }

    #[test]
    fn test_best_seller_projection() {
        let response = ReportResponse::from(ReportData {
            total_transaction: 2,
            total_revenue_cents: 7500,
            best_seller: Some(BestSeller {
                product_id: 3,
                product_uuid: "p-uuid".to_string(),
                name: "Cola".to_string(),
                quantity: 6,
            }),
        });

        assert_eq!(response.total_revenue, 75.0);
        assert_eq!(response.most_purchased_item.id, "p-uuid");
        assert_eq!(response.most_purchased_item.quantity, 6);
    }
}
