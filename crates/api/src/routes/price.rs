use axum::Json;
use axum::extract::State;

use crate::server::AppState;
use crate::types::PriceResponse;

/// 获取当前 BTC 价格快照
///
/// 返回最近一次成功轮询的结果；上游故障期间返回最后一次已知值。
#[utoipa::path(
    get,
    path = "/api/btc-price",
    tag = "行情 (Price)",
    responses(
        (status = 200, description = "当前价格与 24 小时涨跌", body = PriceResponse)
    )
)]
pub async fn get_btc_price(State(state): State<AppState>) -> Json<PriceResponse> {
    Json(PriceResponse::from(state.snapshot.current()))
}
