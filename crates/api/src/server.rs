//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use hikari_core::common::time::TimeProvider;
use hikari_core::price::port::SnapshotReader;

use crate::error::ApiError;
use crate::routes::{health, price};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `snapshot` 只读，写入方是后台轮询器。
/// - 生命周期与进程等同，由 DI 容器在服务启动前注入。
#[derive(Clone)]
pub struct AppState {
    /// 当前价格快照的只读视图
    pub snapshot: Arc<dyn SnapshotReader>,
    /// 时钟 (健康检查时间戳)
    pub clock: Arc<dyn TimeProvider>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "hikari 价格牌 API",
        version = "0.1.0",
        description = "面向嵌入式显示设备的只读价格接口：当前 BTC 价格、24 小时涨跌与健康检查。",
        license(name = "MIT")
    ),
    tags(
        (name = "行情 (Price)", description = "当前价格快照"),
        (name = "系统 (System)", description = "存活探测")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树。
///
/// # Logic
/// 1. 注册业务路由并收集 OpenAPI 文档。
/// 2. 挂载 Swagger UI。
/// 3. 未匹配路由统一返回 404 JSON。
/// 4. 处理器 panic 转换为 500 JSON。
/// 5. 放开 CORS，允许任意来源访问。
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(price::get_btc_price))
        .routes(routes!(health::health))
        .with_state(state)
        .split_for_parts();

    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(detail).into_response()
}

/// # Summary
/// 在已绑定的监听器上提供服务，直到 `shutdown` 完成。
///
/// # Arguments
/// * `listener` - 已绑定的 TCP 监听器
/// * `state` - 共享状态
/// * `shutdown` - 优雅关停信号
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// 绑定地址并启动 HTTP 服务。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:3000"`
/// * `shutdown` - 优雅关停信号
pub async fn start_server<F>(
    state: AppState,
    bind_addr: &str,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind_addr).await?;
    let local = listener.local_addr()?;

    tracing::info!("🚀 hikari API server listening on {}", local);
    tracing::info!("📟 Device endpoint: http://{}/api/btc-price", local);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", local);

    serve(listener, state, shutdown).await?;
    Ok(())
}
