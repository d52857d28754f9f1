//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向显示设备的轻量 JSON 结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use chrono::{DateTime, SecondsFormat, Utc};
use hikari_core::price::entity::PriceSnapshot;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================
//  行情相关 DTO
// ============================================================

/// 当前价格 DTO - 数值统一为保留两位小数的字符串，便于嵌入式端直接显示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    /// 最新价格
    #[schema(example = "50000.00")]
    pub price: String,
    /// 24 小时涨跌额
    #[schema(example = "10000.00")]
    pub change24h: String,
    /// 24 小时涨跌幅 (%)
    #[schema(example = "25.00")]
    pub change_percent24h: String,
    /// 涨跌方向 (up/down)
    #[schema(example = "up")]
    pub direction: String,
    /// 最近更新时间 (ISO 8601)，尚未取得价格时为 null
    #[schema(example = "2024-05-01T12:00:00.000Z")]
    pub last_update: Option<String>,
}

impl From<PriceSnapshot> for PriceResponse {
    fn from(snapshot: PriceSnapshot) -> Self {
        Self {
            price: fixed2(snapshot.price),
            change24h: fixed2(snapshot.change),
            change_percent24h: fixed2(snapshot.change_percent),
            direction: snapshot.direction().as_str().to_string(),
            last_update: snapshot.last_update.map(iso8601),
        }
    }
}

// ============================================================
//  系统相关 DTO
// ============================================================

/// 健康检查 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "2024-05-01T12:00:00.000Z")]
    pub timestamp: String,
}

/// 通用错误响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    #[schema(example = "Not Found")]
    pub error: String,
}

impl ApiErrorResponse {
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// ============================================================
//  格式化工具
// ============================================================

/// # Summary
/// 保留两位小数的定点格式。
///
/// # Logic
/// 1. 按二进制浮点的精确值转换为 `Decimal`。
/// 2. 中点远离零舍入到两位小数。
/// 3. 舍入为零时仅保留原值的负号（`-0.0` 输出 `0.00`，`-0.001` 输出 `-0.00`）。
/// 4. 超出 `Decimal` 范围或非有限值时退回标准浮点格式。
pub fn fixed2(value: f64) -> String {
    match Decimal::from_f64_retain(value) {
        Some(d) => {
            let rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            if rounded.is_zero() {
                let zero = if value < 0.0 { "-0.00" } else { "0.00" };
                zero.to_string()
            } else {
                format!("{rounded:.2}")
            }
        }
        None => format!("{value:.2}"),
    }
}

/// 毫秒精度、`Z` 结尾的 UTC 时间串，例如 `2024-05-01T12:00:00.000Z`
pub fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
