use axum::http::StatusCode;
use portfolio_ledger::api::{self, AppState};
use portfolio_ledger::config::Config;
use portfolio_ledger::datasource::abi::IPortfolioManager;
use portfolio_ledger::{Address, Dashboard, EventKind, MockChainSource};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tower::util::ServiceExt;

const CONTRACT: &str = "0x2222222222222222222222222222222222222222";
const ALICE: &str = "0x1111111111111111111111111111111111111111";
const BOB: &str = "0x3333333333333333333333333333333333333333";
const USDC: u128 = 1_000_000;
const PMT: u128 = 1_000_000_000_000_000_000;

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn setup_test_app(mock: MockChainSource, policy: &str) -> axum::Router {
    let mut env = HashMap::new();
    env.insert("RPC_URL".to_string(), "http://example.invalid".to_string());
    env.insert("PORTFOLIO_MANAGER_ADDRESS".to_string(), CONTRACT.to_string());
    env.insert("DEPLOYMENT_BLOCK".to_string(), "100".to_string());
    env.insert("REDEMPTION_POLICY".to_string(), policy.to_string());
    let config = Config::from_env_map(env).unwrap();
    let dashboard = Arc::new(Dashboard::new(Arc::new(mock), &config));
    api::create_router(AppState::new(config, dashboard))
}

fn with_reads(mock: MockChainSource, investor: &str, unit_value: u128, balance: u128) -> MockChainSource {
    mock.with_uint_return(&IPortfolioManager::getTotalPortfolioUsdcValueCall {}, 10_000 * USDC)
        .with_uint_return(&IPortfolioManager::tokenValueInUsdc6DecCall {}, unit_value)
        .with_uint_return(&IPortfolioManager::totalSupplyCall {}, 10_000 * PMT)
        .with_current_allocations(&["mXAU", "mWBTC", "mETH"], &[400_000, 300_000, 300_000])
        .with_target_allocations(&[400_000, 300_000, 300_000])
        .with_holding(&addr(investor), balance, 150_000)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn alice_history() -> MockChainSource {
    let c = addr(CONTRACT);
    let a = addr(ALICE);
    MockChainSource::new()
        .with_investment_log(&c, EventKind::Invested, &a, 100 * USDC, 10 * PMT, 200, 0)
        .with_investment_log(&c, EventKind::Invested, &a, 200 * USDC, 10 * PMT, 300, 2)
        .with_investment_log(&c, EventKind::Redeemed, &a, 80 * USDC, 5 * PMT, 400, 1)
        .with_investment_log(&c, EventKind::Invested, &addr(BOB), 999 * USDC, 99 * PMT, 350, 0)
}

#[tokio::test]
async fn test_investments_average_cost() {
    let mock = with_reads(alice_history(), ALICE, 16_500_000, 15 * PMT);
    let app = setup_test_app(mock, "average-cost");

    let (status, body) = get(app, &format!("/v1/investments?investor={}", ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let data = &body["data"];
    assert_eq!(data["investor"], ALICE);
    assert_eq!(data["balance"], "15");
    assert_eq!(data["totalCostBasis"], "225.00");
    assert_eq!(data["totalUnitsAcquired"], "15");
    assert_eq!(data["holdingsValue"], "247.50");
    assert_eq!(data["unrealizedGain"], "22.50");
    assert_eq!(data["unrealizedGainPercent"], "10.00");
    assert_eq!(data["ownershipShare"], "0.15");

    let events = data["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["kind"], "Redeem");
    assert_eq!(events[0]["blockNumber"], 400);
    assert_eq!(events[0]["usdcAmount"], "80.00");
    assert_eq!(events[2]["kind"], "Invest");
    let hash = events[0]["transactionHash"].as_str().unwrap();
    assert_eq!(
        events[0]["txUrl"],
        format!("https://sepolia.etherscan.io/tx/{}", hash)
    );
    assert!(data["anomalies"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_investments_direct_debit() {
    let mock = with_reads(alice_history(), ALICE, 16_500_000, 15 * PMT);
    let app = setup_test_app(mock, "direct-debit");

    let (_, body) = get(app, &format!("/v1/investments?investor={}", ALICE)).await;
    assert_eq!(body["data"]["totalCostBasis"], "220.00");
    assert_eq!(body["data"]["unrealizedGain"], "27.50");
}

#[tokio::test]
async fn test_investments_no_history_is_ready_with_unavailable_percent() {
    let mock = with_reads(MockChainSource::new(), ALICE, USDC, 0);
    let app = setup_test_app(mock, "average-cost");

    let (status, body) = get(app, &format!("/v1/investments?investor={}", ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["data"]["totalCostBasis"], "0.00");
    assert_eq!(body["data"]["unrealizedGain"], "0.00");
    assert!(body["data"]["unrealizedGainPercent"].is_null());
    assert!(body["data"]["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_investments_chain_failure_is_error_state() {
    let app = setup_test_app(
        MockChainSource::new().with_failure("connection refused"),
        "average-cost",
    );

    let (status, body) = get(app, &format!("/v1/investments?investor={}", ALICE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_investments_missing_holding_read_is_error_state() {
    // History is available but balanceOf has no answer.
    let app = setup_test_app(alice_history(), "average-cost");
    let (_, body) = get(app, &format!("/v1/investments?investor={}", ALICE)).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_investments_invalid_address() {
    let app = setup_test_app(MockChainSource::new(), "average-cost");
    let (status, body) = get(app, "/v1/investments?investor=0x123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid investor address");
}

#[tokio::test]
async fn test_investments_missing_investor_is_json_bad_request() {
    for uri in ["/v1/investments", "/v1/investments?investor="] {
        let app = setup_test_app(MockChainSource::new(), "average-cost");
        let (status, body) = get(app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }

    let app = setup_test_app(MockChainSource::new(), "average-cost");
    let (_, body) = get(app, "/v1/investments").await;
    assert!(body["error"].as_str().unwrap().contains("investor"));
}
