use crate::history::PriceHistory;
use chrono::Duration;
use hikari_core::price::entity::Sample;
use tracing::debug;

/// 参考价最小年龄（秒）：23 小时。离散轮询下 23h~24h 的样本视为 "24 小时前"。
pub const REFERENCE_MIN_AGE_SECS: i64 = 23 * 60 * 60;

/// # Summary
/// 一次涨跌计算的结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDelta {
    // 涨跌额
    pub change: f64,
    // 涨跌幅（百分比）
    pub change_percent: f64,
    // 本次使用的参考价
    pub reference: f64,
}

/// # Summary
/// 24 小时涨跌计算器，持有粘性参考价。
///
/// # Invariants
/// - 窗口中最旧样本年龄达到 `min_age` 时，无条件覆盖参考价。
/// - 否则沿用上一次的参考价，不会因为本轮没有候选而清空。
/// - 参考价一旦设置不再重新校验其真实年龄，会随最旧样本的轮换向前漂移。
#[derive(Debug, Clone)]
pub struct DeltaEngine {
    // 当前参考样本
    reference: Option<Sample>,
    // 候选样本的最小年龄
    min_age: Duration,
}

impl DeltaEngine {
    pub fn new() -> Self {
        Self::with_min_age(Duration::seconds(REFERENCE_MIN_AGE_SECS))
    }

    pub fn with_min_age(min_age: Duration) -> Self {
        Self {
            reference: None,
            min_age,
        }
    }

    /// 当前参考价
    pub fn reference(&self) -> Option<f64> {
        self.reference.map(|s| s.price)
    }

    /// # Summary
    /// 选择参考价并计算涨跌。
    ///
    /// # Logic
    /// 1. 以当前样本时刻为 `now`，检查窗口最旧样本年龄。
    /// 2. 年龄 >= `min_age` 则采纳为新参考价。
    /// 3. 有参考价时计算 `change = current - reference`、`change_percent = change / reference * 100`。
    ///
    /// # Arguments
    /// * `current`: 本轮样本。
    /// * `history`: 已完成追加与裁剪的窗口。
    ///
    /// # Returns
    /// 有参考价返回计算结果，否则返回 None，由调用方沿用上一次的数值。
    pub fn compute(&mut self, current: &Sample, history: &PriceHistory) -> Option<PriceDelta> {
        if let Some(oldest) = history.oldest() {
            if oldest.age(current.timestamp) >= self.min_age {
                if self.reference != Some(oldest) {
                    debug!(
                        reference = oldest.price,
                        sampled_at = %oldest.timestamp,
                        "24h reference price adopted"
                    );
                }
                self.reference = Some(oldest);
            }
        }

        let reference = self.reference?.price;
        let change = current.price - reference;
        Some(PriceDelta {
            change,
            change_percent: change / reference * 100.0,
            reference,
        })
    }
}

impl Default for DeltaEngine {
    fn default() -> Self {
        Self::new()
    }
}
