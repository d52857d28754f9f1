use axum::Json;
use axum::extract::State;

use crate::server::AppState;
use crate::types::{HealthResponse, iso8601};

/// 健康检查，进程存活即返回 ok
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务存活", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: iso8601(state.clock.now()),
    })
}
