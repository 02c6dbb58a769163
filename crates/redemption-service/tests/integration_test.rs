//! Integration tests for the coupon API

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use coupon_common::default_catalog;
use redemption_service::{
    create_router, AppState, DocumentStore, MemoryStore, NotificationSink, SharedStore, StoreError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// A store that cannot be reached
struct Unreachable;

#[async_trait]
impl DocumentStore for Unreachable {
    async fn get(&self, _name: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn put(&self, _name: &str, _document: &Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn create_test_app(store: SharedStore) -> axum::Router {
    create_router(AppState::new(
        store,
        default_catalog(),
        NotificationSink::disabled(),
    ))
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_redeem(app: &axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/redeem")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "redemption-service");
}

#[tokio::test]
async fn test_coupons_from_empty_store_use_default_catalog() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, json) = get_json(&app, "/api/coupons").await;

    assert_eq!(status, StatusCode::OK);
    let coupons = json.as_array().unwrap();
    assert_eq!(coupons.len(), 9);
    assert_eq!(coupons[0]["id"], 1);
    assert_eq!(coupons[0]["title"], "Bubble Tea Craving Satisfier");
    assert_eq!(coupons[0]["iconName"], "coffee");
    assert_eq!(coupons[0]["maxClaims"], 5);
    assert!(coupons.iter().all(|c| c["currentClaims"] == 0));
}

#[tokio::test]
async fn test_stored_catalog_hides_inactive_coupons() {
    let store = MemoryStore::new().with_document(
        "coupons.json",
        json!([
            {"id": 1, "title": "Coffee", "description": "A coffee", "iconName": "coffee", "maxClaims": 5, "isActive": true},
            {"id": 2, "title": "Retired", "description": "Gone", "iconName": "x", "maxClaims": 1, "isActive": false}
        ]),
    );
    let app = create_test_app(Arc::new(store));

    let (_, json) = get_json(&app, "/api/coupons").await;

    assert_eq!(
        json,
        json!([{
            "id": 1,
            "title": "Coffee",
            "desc": "A coffee",
            "iconName": "coffee",
            "maxClaims": 5,
            "currentClaims": 0
        }])
    );
}

#[tokio::test]
async fn test_redeem_then_read_back() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, json) = post_redeem(
        &app,
        json!({"couponId": 1, "title": "Coffee", "details": "no sugar"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Coupon redeemed successfully");

    let (_, coupons) = get_json(&app, "/api/coupons").await;
    for coupon in coupons.as_array().unwrap() {
        let expected = if coupon["id"] == 1 { 1 } else { 0 };
        assert_eq!(coupon["currentClaims"], expected);
    }

    let (status, history) = get_json(&app, "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["couponId"], 1);
    assert_eq!(history[0]["title"], "Coffee");
    assert_eq!(history[0]["details"], "no sugar");
    assert!(history[0]["timestamp"].is_f64());
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    for title in ["First", "Second", "Third"] {
        let (status, _) =
            post_redeem(&app, json!({"couponId": 4, "title": title}).to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, history) = get_json(&app, "/api/history").await;
    let titles: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);

    let (_, coupons) = get_json(&app, "/api/coupons").await;
    let errand = coupons
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == 4)
        .unwrap();
    assert_eq!(errand["currentClaims"], 3);
}

#[tokio::test]
async fn test_redeem_missing_fields_is_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let app = create_test_app(store.clone());

    let (status, json) = post_redeem(&app, json!({"title": "Coffee"}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("couponId"));

    let (status, json) = post_redeem(&app, json!({"couponId": 1, "title": ""}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("title"));

    // Nothing was written
    assert!(store.get("request-history.json").await.unwrap().is_none());
    assert!(store.get("coupon-state.json").await.unwrap().is_none());
}

#[tokio::test]
async fn test_redeem_malformed_body_is_bad_request() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, json) = post_redeem(&app, "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = post_redeem(
        &app,
        json!({"couponId": "one", "title": "Coffee"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreachable_store_degrades_reads_and_fails_writes() {
    let app = create_test_app(Arc::new(Unreachable));

    let (status, coupons) = get_json(&app, "/api/coupons").await;
    assert_eq!(status, StatusCode::OK);
    let coupons = coupons.as_array().unwrap();
    assert_eq!(coupons.len(), 9);
    assert!(coupons.iter().all(|c| c["currentClaims"] == 0));

    let (status, history) = get_json(&app, "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, json!([]));

    let (status, json) =
        post_redeem(&app, json!({"couponId": 1, "title": "Coffee"}).to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Store details stay in the logs
    assert_eq!(json, json!({"error": "Failed to redeem coupon"}));
}

#[tokio::test]
async fn test_migrated_history_with_fractional_ids_stays_usable() {
    let store = Arc::new(MemoryStore::new().with_document(
        "request-history.json",
        json!([{
            "id": 1700000000000.42,
            "couponId": 2,
            "title": "Late Night Food Run",
            "details": "",
            "timestamp": "2023-11-14T22:13:20Z",
            "redeemedBy": "User"
        }]),
    ));
    let app = create_test_app(store.clone());

    let (status, history) = get_json(&app, "/api/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["title"], "Late Night Food Run");

    let (status, _) =
        post_redeem(&app, json!({"couponId": 1, "title": "Coffee"}).to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = get_json(&app, "/api/history").await;
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert_eq!(history[0]["title"], "Coffee");

    let stored = store.get("request-history.json").await.unwrap().unwrap();
    assert_eq!(stored[0]["redeemedBy"], "User");
}
