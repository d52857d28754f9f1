use hikari_core::price::entity::PriceSnapshot;
use hikari_core::price::port::SnapshotReader;
use std::sync::RwLock;

/// # Summary
/// 当前价格快照的单写多读容器。
///
/// # Invariants
/// - 写入是对整个 `PriceSnapshot` 的一次性替换，读者只会看到旧的完整值或新的完整值。
/// - 只有轮询器持有写入方；API 层通过 `SnapshotReader` 只读访问。
/// - 锁中毒时沿用内部值，读写均不会 panic。
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<PriceSnapshot>,
}

impl SnapshotStore {
    /// 以零值快照初始化
    pub fn new() -> Self {
        Self::default()
    }

    /// 原子地替换当前快照
    pub fn publish(&self, snapshot: PriceSnapshot) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }
}

impl SnapshotReader for SnapshotStore {
    fn current(&self) -> PriceSnapshot {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}
