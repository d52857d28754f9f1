//! # `hikari-tracker` - 滚动窗口价格追踪
//!
//! - `history`: 24 小时滚动价格窗口
//! - `delta`: 参考价选择与涨跌计算
//! - `snapshot`: 单写多读的当前快照
//! - `poller`: 定时驱动抓取、计算与发布

pub mod delta;
pub mod history;
pub mod poller;
pub mod snapshot;
