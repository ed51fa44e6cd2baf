use axum::http::StatusCode;
use portfolio_ledger::api::{self, AppState};
use portfolio_ledger::config::Config;
use portfolio_ledger::{Dashboard, MockChainSource};
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

fn setup_test_app(mock: MockChainSource) -> axum::Router {
    let mut env = HashMap::new();
    env.insert("RPC_URL".to_string(), "http://example.invalid".to_string());
    env.insert(
        "PORTFOLIO_MANAGER_ADDRESS".to_string(),
        "0x2222222222222222222222222222222222222222".to_string(),
    );
    let config = Config::from_env_map(env).unwrap();
    let dashboard = Arc::new(Dashboard::new(Arc::new(mock), &config));
    api::create_router(AppState::new(config, dashboard))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app(MockChainSource::new());
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = setup_test_app(MockChainSource::new().with_latest_block(6_000_000));
    let (status, body) = get(app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["latestBlock"], 6_000_000);
}

#[tokio::test]
async fn test_ready_endpoint_chain_down() {
    let app = setup_test_app(MockChainSource::new().with_failure("connection refused"));
    let (status, body) = get(app, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = setup_test_app(MockChainSource::new());
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/v1/positions")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
