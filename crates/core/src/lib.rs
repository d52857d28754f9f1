//! # `hikari-core` - 领域内核
//!
//! 定义价格牌后端的领域实体、端口 (Port) 与错误类型。
//! 本 crate 不依赖任何具体的网络或运行时实现，其余 crate 只通过这里的 Trait 互相协作。

pub mod common;
pub mod config;
pub mod price;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
