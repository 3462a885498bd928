//! Liveness check.
//!
//! Deliberately static: it answers as long as the process serves HTTP and
//! does not touch the database. Readiness is [`Database::health_check`].
//!
//! [`Database::health_check`]: storefront_db::Database::health_check

use axum::Json;
use serde::{Deserialize, Serialize};

/// `{"code":200,"status":"OK"}`, also returned by successful deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub code: u16,
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        StatusResponse {
            code: 200,
            status: "OK".to_string(),
        }
    }
}

/// `GET /`
pub async fn liveness() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_payload() {
        let json = serde_json::to_string(&StatusResponse::ok()).unwrap();
        assert_eq!(json, r#"{"code":200,"status":"OK"}"#);
    }
}
