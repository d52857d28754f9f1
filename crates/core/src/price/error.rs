use thiserror::Error;

/// # Summary
/// 价格源错误枚举，覆盖网络、超时、解析及数据缺失等问题。
///
/// # Invariants
/// - 对轮询器而言所有变体均为瞬时错误，只会中止当次 tick。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 请求超出时限
    #[error("Request timed out after {0} ms")]
    Timeout(u64),
    // 数据解析错误，如 JSON 格式不匹配或数值越界
    #[error("Parse error: {0}")]
    Parse(String),
    // 响应中没有目标价格源
    #[error("Price feed not found in response")]
    NotFound,
    // 上游返回非成功状态
    #[error("Upstream error: {0}")]
    Upstream(String),
}
