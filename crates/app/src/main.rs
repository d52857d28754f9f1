mod settings;

use std::sync::Arc;

use hikari_api::server::{AppState, start_server};
use hikari_core::common::time::{RealTimeProvider, TimeProvider};
use hikari_feed::hermes::HermesProvider;
use hikari_tracker::poller::PricePoller;
use hikari_tracker::snapshot::SnapshotStore;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并注入轮询器与 API 服务。
///
/// # Logic
/// 1. 加载 `.env` 并初始化全局日志。
/// 2. 加载并校验配置。
/// 3. 实例化基础设施层（时钟、价格源、快照容器）。
/// 4. 启动后台轮询器（首个 tick 立即执行）。
/// 5. 启动 HTTP 服务，直到收到退出信号。
/// 6. 关停轮询器。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 1. 初始化日志
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .init();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv = dotenv_loaded,
        "hikari price sign server starting..."
    );

    // 2. 加载配置
    let config = settings::load()?;
    config.validate()?;
    info!(
        interval_ms = config.poller.interval_ms,
        timeout_ms = config.feed.request_timeout_ms,
        "configuration loaded"
    );

    // 3. 实例化基础设施层
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let feed = Arc::new(HermesProvider::new(&config.feed)?);
    info!(source = %config.feed.base_url, feed = %feed.feed_id(), "price source ready");
    let snapshot = Arc::new(SnapshotStore::new());

    // 4. 启动轮询器
    let poller = PricePoller::from_config(&config, feed, clock.clone(), snapshot.clone()).spawn();

    // 5. 启动 HTTP 服务
    let state = AppState { snapshot, clock };
    let served = start_server(state, &config.bind_addr(), shutdown_signal()).await;
    if let Err(e) = &served {
        error!(error = %e, "API server error");
    }

    // 6. 关停轮询器
    if poller.is_finished() {
        warn!("price poller exited before shutdown");
    }
    info!("shutting down price poller");
    if let Err(e) = poller.shutdown().await {
        error!(error = %e, "price poller task failed");
    }
    info!("shutdown complete");

    served
}

/// 等待 SIGINT / SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT"),
        _ = terminate => info!("received SIGTERM"),
    }
}
