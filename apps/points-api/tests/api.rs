//! End-to-end tests for the HTTP surface.
//!
//! Each test builds the full router over an in-memory SQLite database and
//! the in-memory cache, then drives it with `oneshot` requests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use points_api::{router, AppState};
use points_db::{Database, DbConfig, StoreStats};
use points_service::{MemoryCache, RateLimitConfig, RateLimiter, ReceiptService};
use serde_json::{json, Value};
use tokio::sync::watch;
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

async fn app_with_limits(limits: RateLimitConfig) -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let service = ReceiptService::new(Arc::new(db.receipts()), Arc::new(MemoryCache::new()));
    let (_tx, stats) = watch::channel(StoreStats::default());

    router(AppState {
        service,
        limiter: RateLimiter::new(limits),
        db,
        stats,
        request_timeout: Duration::from_secs(5),
    })
}

async fn app() -> Router {
    app_with_limits(RateLimitConfig::disabled()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn target() -> Value {
    json!({
        "retailer": "Target",
        "purchaseDate": "2022-01-01",
        "purchaseTime": "13:01",
        "items": [
            { "shortDescription": "Mountain Dew 12PK", "price": 6.49 },
            { "shortDescription": "Emils Cheese Pizza", "price": 12.25 },
            { "shortDescription": "Knorr Creamy Chicken", "price": 1.26 },
            { "shortDescription": "Doritos Nacho Cheese", "price": 3.35 },
            { "shortDescription": "   Klarbrunn 12-PK 12 FL OZ  ", "price": 12.00 }
        ],
        "total": 35.35
    })
}

fn corner_market() -> Value {
    json!({
        "retailer": "M&M Corner Market",
        "purchaseDate": "2022-03-20",
        "purchaseTime": "14:33",
        "items": [
            { "shortDescription": "Gatorade", "price": 2.25 },
            { "shortDescription": "Gatorade", "price": 2.25 },
            { "shortDescription": "Gatorade", "price": 2.25 },
            { "shortDescription": "Gatorade", "price": 2.25 }
        ],
        "total": 9.00
    })
}

async fn process(app: &Router, receipt: &Value) -> String {
    let (status, body) = send(app, post_json("/receipts/process", &receipt.to_string())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Process + Points
// =============================================================================

#[tokio::test]
async fn test_process_then_points() {
    let app = app().await;

    let id = process(&app, &target()).await;
    let (status, body) = send(&app, get(&format!("/receipts/{id}/points"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "points": 28 }));

    let id = process(&app, &corner_market()).await;
    let (_, body) = send(&app, get(&format!("/receipts/{id}/points"))).await;
    assert_eq!(body["points"], 109);
}

#[tokio::test]
async fn test_total_mismatch_is_invalid() {
    let app = app().await;
    let mut receipt = corner_market();
    receipt["items"][3]["price"] = json!(2.26);

    let (status, body) = send(&app, post_json("/receipts/process", &receipt.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID");
    assert_eq!(body["message"], "Invalid receipt");
    assert!(body["details"]["total"].is_array());

    let (_, body) = send(&app, get("/receipts")).await;
    assert_eq!(body["receipts"], json!([]));
}

#[tokio::test]
async fn test_amounts_validated_in_cents() {
    let app = app().await;
    let mut receipt = corner_market();
    receipt["total"] = json!(0.004);
    receipt["items"] = json!([{ "shortDescription": "Gum", "price": 0.004 }]);

    let (status, body) = send(&app, post_json("/receipts/process", &receipt.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["details"]["total"], json!(["total must be greater than zero"]));

    receipt["total"] = json!(1e17);
    receipt["items"] = json!([{ "shortDescription": "Yacht", "price": 1e17 }]);
    let (status, body) = send(&app, post_json("/receipts/process", &receipt.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["details"]["total"], json!(["total must be at most 999999999.99"]));
}

#[tokio::test]
async fn test_all_field_errors_reported() {
    let app = app().await;
    let receipt = json!({
        "retailer": "",
        "purchaseDate": "2022-13-01",
        "purchaseTime": "25:00",
        "items": [],
        "total": 0
    });

    let (status, body) = send(&app, post_json("/receipts/process", &receipt.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["details"].as_object().unwrap();
    for field in ["retailer", "purchaseDate", "purchaseTime", "items", "total"] {
        assert!(details.contains_key(field), "missing {field}: {body}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_invalid() {
    let app = app().await;

    let (status, body) = send(&app, post_json("/receipts/process", "{ not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID");

    // Wrong type
    let mut receipt = target();
    receipt["total"] = json!("35.35");
    let (status, _) = send(&app, post_json("/receipts/process", &receipt.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown field
    let mut receipt = target();
    receipt["cashier"] = json!("Bob");
    let (status, _) = send(&app, post_json("/receipts/process", &receipt.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_points_not_found() {
    let app = app().await;

    let (status, body) = send(&app, get("/receipts/not-a-uuid/points")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let id = uuid::Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/receipts/{id}/points"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Receipt not found");
    assert!(body.get("details").is_none());
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_receipts_paginates() {
    let app = app().await;
    for _ in 0..3 {
        process(&app, &corner_market()).await;
    }
    process(&app, &target()).await;

    let (status, body) = send(&app, get("/receipts?page=1&limit=3&sort=-total")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["receipts"].as_array().unwrap().len(), 3);
    assert_eq!(body["receipts"][0]["retailer"], "Target");
    assert_eq!(body["receipts"][0]["items"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["metadata"],
        json!({ "page": 1, "limit": 3, "firstPage": 1, "lastPage": 2, "total": 4 })
    );

    let (_, body) = send(&app, get("/receipts?page=2&limit=3&sort=-total")).await;
    assert_eq!(body["receipts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_receipts_defaults_and_empty() {
    let app = app().await;

    let (status, body) = send(&app, get("/receipts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["receipts"], json!([]));
    assert!(body["metadata"].is_null());

    // The empty default page is now cached, so ask for a different sort
    process(&app, &target()).await;
    let (_, body) = send(&app, get("/receipts?sort=-id")).await;
    assert_eq!(body["receipts"].as_array().unwrap().len(), 1);
    assert_eq!(body["metadata"]["limit"], 20);
    assert_eq!(body["metadata"]["page"], 1);
}

#[tokio::test]
async fn test_list_receipts_bad_filters() {
    let app = app().await;

    let (status, body) = send(&app, get("/receipts?page=0&limit=101&sort=points")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["details"].as_object().unwrap();
    assert!(details.contains_key("page"));
    assert!(details.contains_key("limit"));
    assert!(details.contains_key("sort"));

    let (status, body) = send(&app, get("/receipts?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID");
}

// =============================================================================
// Rate Limiting + Health
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let app = app_with_limits(RateLimitConfig {
        requests_per_second: 0.001,
        burst: 2,
        ..Default::default()
    })
    .await;

    assert_eq!(send(&app, get("/receipts")).await.0, StatusCode::OK);
    assert_eq!(send(&app, get("/receipts")).await.0, StatusCode::OK);

    let (status, body) = send(&app, get("/receipts")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "TOO_MANY_REQUESTS");

    // Health is not rate limited
    assert_eq!(send(&app, get("/health")).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let app = app().await;

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stats"]["receipts"], 0);
}
