//! # `hikari-api` - HTTP API 网关
//!
//! 本 crate 是价格牌后端的只读 HTTP 服务入口。
//! 使用 `axum` 构建路由，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自显示设备或浏览器的 HTTP 请求
//! - 通过 `SnapshotReader` 读取当前价格快照
//! - 将领域模型转换为 DTO 返回

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
