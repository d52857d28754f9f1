//! # `hikari-feed` - 预言机价格源
//!
//! 基于 Pyth Hermes REST 接口实现 `PriceSource`。

pub mod hermes;
