use chrono::{DateTime, Duration, Utc};
use hikari_core::price::entity::Sample;
use std::collections::VecDeque;

/// 滚动窗口长度（秒）：24 小时
pub const WINDOW_SECS: i64 = 24 * 60 * 60;

/// # Summary
/// 按时间升序保存的滚动价格窗口。
///
/// # Invariants
/// - 样本只从尾部追加，从头部裁剪，不做排序或随机删除。
/// - 每次 `prune(now)` 之后，剩余样本均满足 `now - timestamp < window`。
/// - 追加与裁剪之间的中间状态不得被查询，调用方需在同一 tick 内先 `append` 再 `prune`。
#[derive(Debug, Clone)]
pub struct PriceHistory {
    // 样本队列，头部最旧
    samples: VecDeque<Sample>,
    // 保留时长
    window: Duration,
}

impl PriceHistory {
    /// 创建 24 小时窗口
    pub fn new() -> Self {
        Self::with_window(Duration::seconds(WINDOW_SECS))
    }

    /// # Summary
    /// 创建指定保留时长的窗口。
    ///
    /// # Arguments
    /// * `window`: 保留时长。
    ///
    /// # Returns
    /// 空窗口。
    pub fn with_window(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
        }
    }

    /// 在尾部追加一个样本
    pub fn append(&mut self, sample: Sample) {
        self.samples.push_back(sample);
    }

    /// # Summary
    /// 裁剪过期样本。
    ///
    /// # Logic
    /// 1. 从头部开始检查，样本年龄 `now - timestamp >= window` 即弹出。
    /// 2. 遇到第一个未过期样本即停止，后续样本更新，无需再检查。
    ///
    /// # Arguments
    /// * `now`: 当前时刻。
    ///
    /// # Returns
    /// 被移除的样本数量。
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        while let Some(front) = self.samples.front() {
            if front.age(now) >= self.window {
                self.samples.pop_front();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    /// 最早的剩余样本
    pub fn oldest(&self) -> Option<Sample> {
        self.samples.front().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new()
    }
}
