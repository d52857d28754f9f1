use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use hikari_api::server::{AppState, serve};
use hikari_api::types::{HealthResponse, PriceResponse};
use hikari_core::common::time::FakeClockProvider;
use hikari_core::price::error::FeedError;
use hikari_core::test_utils::ScriptedPriceSource;
use hikari_tracker::poller::PricePoller;
use hikari_tracker::snapshot::SnapshotStore;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    source: Arc<ScriptedPriceSource>,
    clock: Arc<FakeClockProvider>,
    poller: PricePoller,
    _shutdown: oneshot::Sender<()>,
}

// 工作区统一测试时 reqwest 以 rustls-no-provider 编译，客户端创建前须安装加密后端
fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }
}

// 帮助函数：在随机端口启动测试服务器，轮询器由测试手动驱动
async fn spawn_test_server() -> TestServer {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();
    install_crypto_provider();

    let source = Arc::new(ScriptedPriceSource::new());
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let clock = Arc::new(FakeClockProvider::new(start));
    let snapshot = Arc::new(SnapshotStore::new());
    let poller = PricePoller::new(
        source.clone(),
        clock.clone(),
        snapshot.clone(),
        Duration::from_secs(5),
        Duration::from_secs(4),
    );

    let state = AppState {
        snapshot,
        clock: clock.clone(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        serve(listener, state, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    TestServer {
        base_url,
        source,
        clock,
        poller,
        _shutdown: tx,
    }
}

async fn get_price(client: &reqwest::Client, base_url: &str) -> PriceResponse {
    let res = client
        .get(format!("{}/api/btc-price", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn test_client_builds_after_provider_install() {
    install_crypto_provider();
    assert!(rustls::crypto::CryptoProvider::get_default().is_some());
    assert!(reqwest::Client::builder().build().is_ok());
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/health", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: HealthResponse = res.json().await.unwrap();
    assert_eq!(body.status, "ok");
    assert_eq!(body.timestamp, "2024-05-01T00:00:00.000Z");
}

#[tokio::test]
async fn test_cold_start_price_has_null_last_update() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let raw: serde_json::Value = client
        .get(format!("{}/api/btc-price", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(raw["price"], "0.00");
    assert_eq!(raw["change24h"], "0.00");
    assert_eq!(raw["changePercent24h"], "0.00");
    assert_eq!(raw["direction"], "up");
    assert!(raw["lastUpdate"].is_null());
}

#[tokio::test]
async fn test_price_workflow_across_24_hours() {
    let mut server = spawn_test_server().await;
    let client = reqwest::Client::new();

    // ============================================
    // Case 1: 首个价格，无参考价
    // ============================================
    server.source.push_price(5_000_000, 0);
    server.poller.tick().await;
    let body = get_price(&client, &server.base_url).await;
    assert_eq!(
        body,
        PriceResponse {
            price: "50000.00".into(),
            change24h: "0.00".into(),
            change_percent24h: "0.00".into(),
            direction: "up".into(),
            last_update: Some("2024-05-01T00:00:00.000Z".into()),
        }
    );

    // ============================================
    // Case 2: 23 小时后参考价锁定为 50000，价格 62500 => +25%
    // ============================================
    server.clock.advance(ChronoDuration::hours(23));
    server.source.push_price(6_250_000, 0);
    server.poller.tick().await;
    let body = get_price(&client, &server.base_url).await;
    assert_eq!(body.price, "62500.00");
    assert_eq!(body.change24h, "12500.00");
    assert_eq!(body.change_percent24h, "25.00");
    assert_eq!(body.direction, "up");
    assert_eq!(body.last_update.as_deref(), Some("2024-05-01T23:00:00.000Z"));

    // ============================================
    // Case 3: 价格跌破参考价
    // ============================================
    server.clock.advance(ChronoDuration::seconds(5));
    server.source.push_price(4_900_000, 0);
    server.poller.tick().await;
    let body = get_price(&client, &server.base_url).await;
    assert_eq!(body.change24h, "-1000.00");
    assert_eq!(body.change_percent24h, "-2.00");
    assert_eq!(body.direction, "down");
}

#[tokio::test]
async fn test_reference_scenarios_b_and_c() {
    let mut server = spawn_test_server().await;
    let client = reqwest::Client::new();

    server.source.push_price(4_000_000, 0);
    server.poller.tick().await;

    // 参考价 40000，当前 50000
    server.clock.advance(ChronoDuration::hours(23));
    server.source.push_price(5_000_000, 0);
    server.poller.tick().await;
    let body = get_price(&client, &server.base_url).await;
    assert_eq!(body.change24h, "10000.00");
    assert_eq!(body.change_percent24h, "25.00");
    assert_eq!(body.direction, "up");

    // 参考价 40000，当前 39000
    server.clock.advance(ChronoDuration::seconds(5));
    server.source.push_price(3_900_000, 0);
    server.poller.tick().await;
    let body = get_price(&client, &server.base_url).await;
    assert_eq!(body.change24h, "-1000.00");
    assert_eq!(body.direction, "down");
}

#[tokio::test]
async fn test_failed_tick_serves_identical_bytes() {
    let mut server = spawn_test_server().await;
    let client = reqwest::Client::new();
    let url = format!("{}/api/btc-price", server.base_url);

    server.source.push_price(5_012_345, 0);
    server.poller.tick().await;
    let before = client.get(&url).send().await.unwrap().bytes().await.unwrap();

    server.clock.advance(ChronoDuration::seconds(5));
    server
        .source
        .push_error(FeedError::Network("upstream unreachable".into()));
    server.poller.tick().await;
    let after = client.get(&url).send().await.unwrap().bytes().await.unwrap();

    assert_eq!(before, after);
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/eth-price", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("/api/eth-price"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/btc-price", server.base_url))
        .header("Origin", "http://sign.local")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_openapi_document_lists_endpoints() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let doc: serde_json::Value = client
        .get(format!("{}/api-docs/openapi.json", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"].get("/api/btc-price").is_some());
    assert!(doc["paths"].get("/api/health").is_some());
}
