//! REST routes exercised through the router, without a listening socket
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod helpers;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use helpers::*;
use hgnc_server::api::create_router;
use hgnc_server::config::Config;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    create_router(imported_pool().await, &Config::default().cors)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app().await, request).await
}

async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app().await, request).await
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_get_with_scalar_filter() {
    let (status, body) = get("/api/v1/query/hgnc?symbol=A1BG").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["meta"], json!({"entity": "hgnc", "rows": 1}));
    assert_eq!(body["data"][0]["identifier"], 5);
    assert_eq!(body["data"][0]["date_approved_reserved"], "1989-06-30");
}

#[tokio::test]
async fn test_get_repeated_key_is_a_set() {
    let (status, body) = get("/api/v1/query/hgnc?identifier=5&identifier=250&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    let symbols: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|gene| gene["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, vec!["A1BG", "ADH1B"]);
}

#[tokio::test]
async fn test_get_as_table() {
    let (status, body) = get("/api/v1/query/enzyme?hgnc_symbol=ADH1B&as_table=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"columns": ["id", "ec_number"], "rows": [[1, "1.1.1.1"]]})
    );
}

#[tokio::test]
async fn test_post_with_json_body() {
    let (status, body) = post(
        "/api/v1/query/pubmed",
        json!({"hgnc_symbol": ["A1BG", "ADH1B"], "limit": [1, 1]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{"id": 3, "pubmedid": 3000771}]));
}

#[tokio::test]
async fn test_unknown_entity_is_not_found() {
    let (status, body) = get("/api/v1/query/genes").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_query_errors_are_bad_requests() {
    let (status, body) = get("/api/v1/query/enzyme?symbol=ADH1B").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNKNOWN_FILTER");

    let (status, body) = get("/api/v1/query/hgnc?identifier=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FILTER_VALUE");

    let (status, body) = post("/api/v1/query/hgnc", json!({"limit": [0, 0]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_LIMIT");

    let (status, body) = post("/api/v1/query/hgnc", json!({"symbol": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FILTER_VALUE");
}
