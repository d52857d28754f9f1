use crate::delta::DeltaEngine;
use crate::history::PriceHistory;
use crate::snapshot::SnapshotStore;
use hikari_core::common::time::TimeProvider;
use hikari_core::config::AppConfig;
use hikari_core::price::entity::{PriceSnapshot, Sample};
use hikari_core::price::error::FeedError;
use hikari_core::price::port::PriceSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// # Summary
/// 单次 tick 的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// 成功抓取并发布了新快照
    Published(PriceSnapshot),
    /// 抓取失败，快照与窗口保持不变
    Skipped(FeedError),
}

/// # Summary
/// 价格轮询器：定时抓取、写入窗口、计算涨跌并发布快照。
///
/// # Invariants
/// - 窗口与参考价只由本结构体独占修改，tick 之间严格串行。
/// - 所有状态写入都发生在唯一的 await (抓取) 之后，tick 在抓取中途被丢弃不会留下半更新状态。
/// - 抓取失败只中止当次 tick，不重试、不清空已发布快照。
pub struct PricePoller {
    // 原始价格源
    source: Arc<dyn PriceSource>,
    // 时钟
    clock: Arc<dyn TimeProvider>,
    // 对外发布的快照
    snapshot: Arc<SnapshotStore>,
    // 24 小时滚动窗口
    history: PriceHistory,
    // 参考价与涨跌计算
    delta: DeltaEngine,
    // 上一次计算出的 (涨跌额, 涨跌幅)，无参考价时沿用
    last_change: (f64, f64),
    // 轮询间隔
    interval: Duration,
    // 单次抓取的时限
    fetch_timeout: Duration,
}

impl PricePoller {
    /// # Summary
    /// 构造轮询器。
    ///
    /// # Arguments
    /// * `source`: 价格源。
    /// * `clock`: 时钟。
    /// * `snapshot`: 快照容器，由 API 层共享读取。
    /// * `interval`: 轮询间隔。
    /// * `fetch_timeout`: 单次抓取时限，应小于 `interval`。
    pub fn new(
        source: Arc<dyn PriceSource>,
        clock: Arc<dyn TimeProvider>,
        snapshot: Arc<SnapshotStore>,
        interval: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            snapshot,
            history: PriceHistory::new(),
            delta: DeltaEngine::new(),
            last_change: (0.0, 0.0),
            interval,
            fetch_timeout,
        }
    }

    /// 按应用配置构造，轮询间隔与抓取时限取自 `poller` / `feed` 配置段
    pub fn from_config(
        config: &AppConfig,
        source: Arc<dyn PriceSource>,
        clock: Arc<dyn TimeProvider>,
        snapshot: Arc<SnapshotStore>,
    ) -> Self {
        Self::new(
            source,
            clock,
            snapshot,
            Duration::from_millis(config.poller.interval_ms),
            Duration::from_millis(config.feed.request_timeout_ms),
        )
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    /// 当前粘性参考价
    pub fn reference(&self) -> Option<f64> {
        self.delta.reference()
    }

    /// # Summary
    /// 执行一次完整的 tick。
    ///
    /// # Logic
    /// 1. 在时限内向价格源请求一条报价。
    /// 2. 失败（含超时、数值非法）时记录日志并直接返回，不触碰任何状态。
    /// 3. 成功时构造样本，先追加再裁剪窗口。
    /// 4. 计算涨跌，无参考价则沿用上一次数值。
    /// 5. 整体替换并发布新快照。
    ///
    /// # Returns
    /// `TickOutcome`。
    pub async fn tick(&mut self) -> TickOutcome {
        let quote = match tokio::time::timeout(self.fetch_timeout, self.source.fetch_latest()).await
        {
            Ok(Ok(quote)) => quote,
            Ok(Err(e)) => return self.skip(e),
            Err(_) => {
                let ms = u64::try_from(self.fetch_timeout.as_millis()).unwrap_or(u64::MAX);
                return self.skip(FeedError::Timeout(ms));
            }
        };

        let (price, confidence) = match (quote.scaled_price(), quote.scaled_confidence()) {
            (Ok(p), Ok(c)) => (p, c),
            (Err(e), _) | (_, Err(e)) => return self.skip(e),
        };
        if !price.is_finite() || price <= 0.0 {
            return self.skip(FeedError::Parse(format!("non-positive price: {price}")));
        }

        let now = self.clock.now();
        let sample = Sample::new(price, now);
        self.history.append(sample);
        let pruned = self.history.prune(now);
        if pruned > 0 {
            debug!(pruned, retained = self.history.len(), "stale samples pruned");
        }

        if let Some(delta) = self.delta.compute(&sample, &self.history) {
            self.last_change = (delta.change, delta.change_percent);
        }
        let (change, change_percent) = self.last_change;

        let snapshot = PriceSnapshot {
            price,
            change,
            change_percent,
            confidence,
            last_update: Some(now),
        };
        self.snapshot.publish(snapshot);

        info!(
            price = %format!("{price:.2}"),
            change_percent = %format!("{change_percent:.2}"),
            "BTC price updated"
        );
        TickOutcome::Published(snapshot)
    }

    fn skip(&self, err: FeedError) -> TickOutcome {
        warn!(
            source = self.source.name(),
            error = %err,
            "price fetch failed, keeping last snapshot"
        );
        TickOutcome::Skipped(err)
    }

    /// # Summary
    /// 在 tokio 运行时上启动轮询循环。
    ///
    /// # Logic
    /// 1. 创建关停信号与手动触发器。
    /// 2. 后台任务立即执行首个 tick，之后按固定间隔执行。
    ///
    /// # Returns
    /// 用于手动触发与关停的 `PollerHandle`。
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let kick = Arc::new(Notify::new());
        let task = tokio::spawn(self.run(shutdown_rx, kick.clone()));
        PollerHandle {
            shutdown_tx,
            kick,
            task,
        }
    }

    /// # Summary
    /// 轮询主循环。
    ///
    /// # Logic
    /// 1. 等待定时器、手动触发或关停信号之一。
    /// 2. 执行 tick；tick 进行中收到关停信号则放弃该 tick。
    /// 3. 定时器错过的触发直接跳过，tick 之间不会重叠。
    async fn run(mut self, mut shutdown: watch::Receiver<bool>, kick: Arc<Notify>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            source = self.source.name(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "price poller started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = interval.tick() => {}
                _ = kick.notified() => debug!("manual tick requested"),
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("shutdown during tick, in-flight fetch abandoned");
                    break;
                }
                _ = self.tick() => {}
            }
        }

        info!("price poller stopped");
    }
}

/// # Summary
/// 运行中轮询器的控制句柄。
///
/// # Invariants
/// - 丢弃句柄等同于发出关停信号。
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    kick: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// 请求立即执行一次 tick；已有待处理请求时合并为一次
    pub fn kick(&self) {
        self.kick.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// # Summary
    /// 停止轮询并等待后台任务退出。
    ///
    /// # Logic
    /// 1. 发送关停信号。
    /// 2. 等待任务结束；进行中的抓取会被丢弃。
    pub async fn shutdown(self) -> Result<(), JoinError> {
        if self.shutdown_tx.send(true).is_err() {
            debug!("price poller already stopped");
        }
        self.task.await
    }
}
