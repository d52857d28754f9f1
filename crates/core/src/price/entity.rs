use crate::price::error::FeedError;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// # Summary
/// 预言机返回的原始报价，价格与置信区间均为按 `expo` 缩放的整数。
///
/// # Invariants
/// - 实际值 = 原始整数 * 10^expo，价格与置信区间使用同一个指数。
#[derive(Debug, Clone, PartialEq)]
pub struct OracleQuote {
    // 原始价格整数
    pub price: i64,
    // 原始置信区间整数
    pub conf: u64,
    // 十进制指数
    pub expo: i32,
    // 上游发布时间
    pub publish_time: Option<DateTime<Utc>>,
}

impl OracleQuote {
    /// # Summary
    /// 计算缩放后的实际价格。
    ///
    /// # Logic
    /// 1. 以 `Decimal` 精确地完成 `price * 10^expo`。
    /// 2. 一次性转换为 `f64`。
    ///
    /// # Returns
    /// 成功返回价格，数值越界返回 `FeedError::Parse`。
    pub fn scaled_price(&self) -> Result<f64, FeedError> {
        scale_by_exponent(i128::from(self.price), self.expo)
    }

    /// 计算缩放后的置信区间，与价格使用相同指数
    pub fn scaled_confidence(&self) -> Result<f64, FeedError> {
        scale_by_exponent(i128::from(self.conf), self.expo)
    }
}

fn scale_by_exponent(raw: i128, expo: i32) -> Result<f64, FeedError> {
    let magnitude = expo.unsigned_abs();
    let value = if expo <= 0 {
        Decimal::try_from_i128_with_scale(raw, magnitude)
            .map_err(|e| FeedError::Parse(format!("cannot scale {raw}e{expo}: {e}")))?
    } else {
        let base = Decimal::try_from_i128_with_scale(raw, 0)
            .map_err(|e| FeedError::Parse(format!("cannot scale {raw}e{expo}: {e}")))?;
        10_i64
            .checked_pow(magnitude)
            .and_then(|factor| base.checked_mul(Decimal::from(factor)))
            .ok_or_else(|| FeedError::Parse(format!("exponent overflow: {raw}e{expo}")))?
    };

    value
        .to_f64()
        .ok_or_else(|| FeedError::Parse(format!("value out of range: {value}")))
}

/// # Summary
/// 单个带时间戳的价格样本。
///
/// # Invariants
/// - 创建后不可变，以值拷贝的方式交给历史窗口持有。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    // 实际价格
    pub price: f64,
    // 采样时刻
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    pub fn new(price: f64, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }

    /// 样本相对 `now` 的年龄
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }
}

/// # Summary
/// 24 小时涨跌方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// # Summary
/// 对外发布的当前价格快照。
///
/// # Invariants
/// - 进程内任意时刻只存在一个当前值，且只会被整体替换。
/// - 启动时各数值为 0，`last_update` 为空。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriceSnapshot {
    // 最新价格
    pub price: f64,
    // 相对 24 小时参考价的涨跌额
    pub change: f64,
    // 相对 24 小时参考价的涨跌幅（百分比）
    pub change_percent: f64,
    // 置信区间，与价格同尺度
    pub confidence: f64,
    // 最近一次成功更新的时间
    pub last_update: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    /// 涨跌额非负视为上涨
    pub fn direction(&self) -> Direction {
        if self.change >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: i64, conf: u64, expo: i32) -> OracleQuote {
        OracleQuote {
            price,
            conf,
            expo,
            publish_time: None,
        }
    }

    #[test]
    fn test_negative_exponent_scaling() {
        let q = quote(6_500_012_345_678, 3_210_000_000, -8);
        assert!((q.scaled_price().unwrap() - 65_000.123_456_78).abs() < 1e-9);
        assert!((q.scaled_confidence().unwrap() - 32.1).abs() < 1e-9);
    }

    #[test]
    fn test_positive_and_zero_exponent_scaling() {
        assert_eq!(quote(42, 1, 0).scaled_price().unwrap(), 42.0);
        assert_eq!(quote(42, 1, 3).scaled_price().unwrap(), 42_000.0);
        assert_eq!(quote(42, 1, 3).scaled_confidence().unwrap(), 1_000.0);
    }

    #[test]
    fn test_out_of_range_exponent_is_parse_error() {
        assert!(matches!(
            quote(1, 1, -40).scaled_price(),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            quote(i64::MAX, 1, 30).scaled_price(),
            Err(FeedError::Parse(_))
        ));
    }

    #[test]
    fn test_direction_treats_zero_as_up() {
        let mut snap = PriceSnapshot::default();
        assert_eq!(snap.direction(), Direction::Up);
        snap.change = -0.01;
        assert_eq!(snap.direction(), Direction::Down);
        snap.change = -0.0;
        assert_eq!(snap.direction(), Direction::Up);
    }
}
