//! 测试辅助：可编排的价格源。

use crate::price::entity::OracleQuote;
use crate::price::error::FeedError;
use crate::price::port::PriceSource;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// # Summary
/// 按预设脚本依次返回结果的价格源。
///
/// # Invariants
/// - 脚本耗尽后返回 `FeedError::NotFound`。
#[derive(Default)]
pub struct ScriptedPriceSource {
    script: Mutex<VecDeque<Result<OracleQuote, FeedError>>>,
    calls: AtomicUsize,
}

impl ScriptedPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个以 2 位小数 (expo = -2) 表示的成功报价
    pub fn push_price(&self, price_cents: i64, conf_cents: u64) {
        self.push(Ok(OracleQuote {
            price: price_cents,
            conf: conf_cents,
            expo: -2,
            publish_time: None,
        }));
    }

    /// 追加一个失败结果
    pub fn push_error(&self, err: FeedError) {
        self.push(Err(err));
    }

    pub fn push(&self, item: Result<OracleQuote, FeedError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(item);
    }

    /// 已被调用的次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch_latest(&self) -> Result<OracleQuote, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(FeedError::NotFound))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
