use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use storefront_api::{build_router, AppState};
use storefront_core::{CheckoutLimits, CheckoutPolicy, CheckoutRequestItem};
use storefront_db::{Database, DbConfig};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a router over a fresh in-memory database
async fn setup_app(policy: CheckoutPolicy) -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("Failed to init DB");
    let app = build_router(AppState::new(db.clone(), policy));
    (app, db)
}

// Same, with explicit checkout caps
async fn setup_app_with_limits(limits: CheckoutLimits) -> (Router, Database) {
    let db = Database::new(DbConfig::in_memory())
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db.clone(), CheckoutPolicy::Lenient).with_checkout_limits(limits);
    (build_router(state), db)
}

// Helper to send a request and decode the JSON response
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);

    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

// Helper to create a product and return its id
async fn create_product(app: &Router, body: Value) -> String {
    let (status, json) = send(app, Method::POST, "/products", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    json["id"].as_str().unwrap().to_string()
}

async fn product_stock(app: &Router, id: &str) -> Value {
    let (status, json) = send(app, Method::GET, &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    json["stock"].clone()
}

#[tokio::test]
async fn test_liveness() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, json) = send(&app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"code": 200, "status": "OK"}));
}

#[tokio::test]
async fn test_checkout_skips_out_of_stock_item() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;
    let a = create_product(&app, json!({"sku": "A", "name": "Product A", "stock": 5, "price": 10.0})).await;
    let b = create_product(&app, json!({"sku": "B", "name": "Product B", "stock": 0, "price": 20.0})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [
            {"sku_or_id": "A", "quantity": 3},
            {"sku_or_id": "B", "quantity": 1}
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", json);
    assert_eq!(json["total_amount"], 30.0);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], a.as_str());
    assert_eq!(items[0]["product_name"], "Product A");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(items[0]["unit_price"], 10.0);
    assert_eq!(items[0]["total_price"], 30.0);
    assert_eq!(json["date"], Utc::now().date_naive().format("%Y-%m-%d").to_string());

    assert_eq!(product_stock(&app, &a).await, 2);
    assert_eq!(product_stock(&app, &b).await, 0);

    // Recorded transaction reads back in the same shape
    let id = json["id"].as_str().unwrap();
    let (status, stored) = send(&app, Method::GET, &format!("/checkouts/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored, json);
}

#[tokio::test]
async fn test_checkout_by_uuid_clamps_quantity() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;
    let a = create_product(&app, json!({"sku": "A", "name": "Product A", "stock": 2, "price": 1.5})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [{"sku_or_id": a, "quantity": 5}]})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["items"][0]["quantity"], 2);
    assert_eq!(json["total_amount"], 3.0);
    assert_eq!(product_stock(&app, &a).await, 0);
}

#[tokio::test]
async fn test_checkout_empty_request() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, json) = send(&app, Method::POST, "/checkouts", Some(json!({"items": []}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "EMPTY_REQUEST");
}

#[tokio::test]
async fn test_checkout_no_products_found_changes_nothing() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;
    let b = create_product(&app, json!({"sku": "B", "name": "Product B", "stock": 0, "price": 20.0})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [
            {"sku_or_id": "GHOST", "quantity": 1},
            {"sku_or_id": "B", "quantity": 1}
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "NO_PRODUCTS_FOUND");
    assert_eq!(product_stock(&app, &b).await, 0);

    let (_, report) = send(&app, Method::GET, "/reports/today", None).await;
    assert_eq!(report["total_transaction"], 0);
}

#[tokio::test]
async fn test_strict_checkout_rejects_unknown_item() {
    let (app, _db) = setup_app(CheckoutPolicy::Strict).await;
    let a = create_product(&app, json!({"sku": "A", "name": "Product A", "stock": 5, "price": 10.0})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [
            {"sku_or_id": "A", "quantity": 3},
            {"sku_or_id": "GHOST", "quantity": 1}
        ]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "UNRESOLVED_ITEM");
    assert_eq!(product_stock(&app, &a).await, 5);
}

#[tokio::test]
async fn test_checkout_rejects_bad_quantity() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;
    create_product(&app, json!({"sku": "A", "name": "Product A", "stock": 5})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [{"sku_or_id": "A", "quantity": 0}]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_checkout_limits_follow_configuration() {
    let (app, _db) = setup_app_with_limits(CheckoutLimits::new(2, 3)).await;
    create_product(&app, json!({"sku": "U", "name": "Untracked", "price": 1.0})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [{"sku_or_id": "U", "quantity": 4}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Quantity 4 exceeds maximum allowed (3)");

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [
            {"sku_or_id": "U", "quantity": 1},
            {"sku_or_id": "U", "quantity": 1},
            {"sku_or_id": "U", "quantity": 1}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Checkout cannot have more than 2 items");

    let (app, _db) = setup_app_with_limits(CheckoutLimits::new(100, 5000)).await;
    create_product(&app, json!({"sku": "U", "name": "Untracked", "price": 1.0})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [{"sku_or_id": "U", "quantity": 1500}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    assert_eq!(json["total_amount"], 1500.0);
}

#[tokio::test]
async fn test_price_above_ceiling_is_rejected() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"sku": "BIG", "name": "Big", "price": 5e16})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let id = create_product(&app, json!({"sku": "TOP", "name": "Top", "price": 1000000.0})).await;

    // 999 × the ceiling price still fits comfortably in the ledger
    let (status, json) = send(
        &app,
        Method::POST,
        "/checkouts",
        Some(json!({"items": [{"sku_or_id": id, "quantity": 999}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    assert_eq!(json["total_amount"], 999000000.0);
}

#[tokio::test]
async fn test_deleted_category_is_hidden() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, category) = send(
        &app,
        Method::POST,
        "/categories",
        Some(json!({"name": "Drinks", "description": "Cold"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap().to_string();

    let product = create_product(&app, json!({"name": "Cola", "category": category_id})).await;
    let (_, before) = send(&app, Method::GET, &format!("/products/{}", product), None).await;
    assert_eq!(before["category"]["name"], "Drinks");

    let (status, json) = send(&app, Method::DELETE, &format!("/categories/{}", category_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"code": 200, "status": "OK"}));

    let (_, after) = send(&app, Method::GET, &format!("/products/{}", product), None).await;
    assert_eq!(after["category"], Value::Null);

    let (_, list) = send(&app, Method::GET, "/categories", None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, &format!("/categories/{}", category_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_with_missing_category_is_rejected() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"name": "Cola", "category": uuid::Uuid::new_v4().to_string()})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "CATEGORY_NOT_FOUND");
}

#[tokio::test]
async fn test_product_crud() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, created) = send(&app, Method::POST, "/products", Some(json!({"name": "Widget"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let sku = created["sku"].as_str().unwrap();
    assert!(sku.starts_with("ITEM-"));
    assert_eq!(sku.len(), "ITEM-".len() + 12);
    assert_eq!(created["stock"], Value::Null);
    assert_eq!(created["price"], Value::Null);
    assert_eq!(created["category"], Value::Null);

    let id = created["id"].as_str().unwrap().to_string();
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/products/{}", id),
        Some(json!({"name": "Widget Pro", "stock": 4, "price": 12.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["sku"], sku);
    assert_eq!(updated["name"], "Widget Pro");
    assert_eq!(updated["stock"], 4);
    assert_eq!(updated["price"], 12.5);

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, Method::GET, &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::DELETE, &format!("/products/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_search() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;
    create_product(&app, json!({"name": "Cola Zero"})).await;
    create_product(&app, json!({"name": "Orange Juice"})).await;
    create_product(&app, json!({"name": "cherry COLA"})).await;

    let (status, json) = send(&app, Method::GET, "/products?search=cola", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cola Zero", "cherry COLA"]);

    let (_, all) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_duplicate_sku_is_rejected() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;
    create_product(&app, json!({"sku": "COLA", "name": "Cola"})).await;

    let (status, json) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({"sku": "COLA", "name": "Another Cola"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DUPLICATE");
}

#[tokio::test]
async fn test_invalid_bodies() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let req = Request::builder()
        .uri("/products")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("invalid json"))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, Method::POST, "/products", Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, Method::POST, "/products", Some(json!({"name": "X", "price": -1.0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/products", Some(json!({"name": "X", "stock": -1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_ids_are_not_found() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    for uri in ["/products/999", "/categories/not-a-uuid", "/checkouts/xyz"] {
        let (status, json) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json["code"], "NOT_FOUND");
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/categories/not-a-uuid",
        Some(json!({"name": "Drinks"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_range() {
    let (app, db) = setup_app(CheckoutPolicy::Lenient).await;
    let ten = create_product(&app, json!({"sku": "TEN", "name": "Ten", "price": 10.0})).await;
    create_product(&app, json!({"sku": "FIFTEEN", "name": "Fifteen", "price": 15.0})).await;

    let checkouts = db.checkouts();
    checkouts
        .checkout_at(
            &[CheckoutRequestItem::new("TEN", 3)],
            CheckoutPolicy::Lenient,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        )
        .await
        .unwrap();
    checkouts
        .checkout_at(
            &[CheckoutRequestItem::new("FIFTEEN", 3)],
            CheckoutPolicy::Lenient,
            Utc.with_ymd_and_hms(2024, 3, 2, 23, 59, 59).unwrap(),
        )
        .await
        .unwrap();
    checkouts
        .checkout_at(
            &[CheckoutRequestItem::new("TEN", 1)],
            CheckoutPolicy::Lenient,
            Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    let (status, json) = send(
        &app,
        Method::GET,
        "/reports?start_date=2024-03-01&end_date=2024-03-02",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_revenue"], 75.0);
    assert_eq!(json["total_transaction"], 2);
    // 3 of each: tie goes to the product created first
    assert_eq!(json["most_purchased_item"]["id"], ten.as_str());
    assert_eq!(json["most_purchased_item"]["name"], "Ten");
    assert_eq!(json["most_purchased_item"]["quantity"], 3);
}

#[tokio::test]
async fn test_report_empty_and_invalid() {
    let (app, _db) = setup_app(CheckoutPolicy::Lenient).await;

    let (status, json) = send(&app, Method::GET, "/reports/today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "total_revenue": 0.0,
            "total_transaction": 0,
            "most_purchased_item": {"id": "", "name": "", "quantity": 0}
        })
    );

    for uri in [
        "/reports",
        "/reports?start_date=2024-03-01",
        "/reports?start_date=2024-13-01&end_date=2024-03-02",
        "/reports?start_date=2024-03-05&end_date=2024-03-02",
    ] {
        let (status, json) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}
