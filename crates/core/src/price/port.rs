use crate::price::entity::{OracleQuote, PriceSnapshot};
use crate::price::error::FeedError;
use async_trait::async_trait;

/// # Summary
/// 预言机价格源接口（原始数据源）。
///
/// # Invariants
/// - 每次调用只针对构造时固定的单一资产。
/// - 实现者不做重试，失败直接返回 `FeedError`，由轮询周期本身充当重试机制。
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// # Summary
    /// 获取最新的一条原始报价。
    ///
    /// # Logic
    /// 1. 向上游发起请求。
    /// 2. 解析出整数价格、置信区间与十进制指数。
    ///
    /// # Returns
    /// 成功返回 `OracleQuote`，失败返回 `FeedError`。
    async fn fetch_latest(&self) -> Result<OracleQuote, FeedError>;

    /// 数据源名称，仅用于日志
    fn name(&self) -> &str;
}

/// # Summary
/// 当前快照的只读视图，API 层只通过此接口访问价格状态。
///
/// # Invariants
/// - 每次读取返回一个完整一致的快照副本，不会看到半更新的字段。
pub trait SnapshotReader: Send + Sync {
    /// 读取当前已发布的快照
    fn current(&self) -> PriceSnapshot;
}
