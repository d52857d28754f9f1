use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置校验错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub feed: FeedConfig,
    pub poller: PollerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Hermes REST 根地址
    pub base_url: String,
    /// 资产价格源 ID (BTC/USD)
    pub price_id: String,
    /// 单次请求超时（毫秒），必须小于轮询间隔
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// 轮询间隔（毫秒）
    pub interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hermes.pyth.network".to_string(),
            price_id: "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43"
                .to_string(),
            request_timeout_ms: 4_000,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

impl AppConfig {
    /// # Summary
    /// 校验配置之间的约束关系。
    ///
    /// # Logic
    /// 1. 轮询间隔不可为 0。
    /// 2. 请求超时不可为 0，且必须严格小于轮询间隔，避免挂起的请求拖住后续 tick。
    /// 3. 价格源 ID 必须是合法十六进制。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poller.interval_ms == 0 {
            return Err(ConfigError::Invalid("poller.interval_ms must be > 0".into()));
        }
        if self.feed.request_timeout_ms == 0
            || self.feed.request_timeout_ms >= self.poller.interval_ms
        {
            return Err(ConfigError::Invalid(format!(
                "feed.request_timeout_ms ({}) must be in 1..{}",
                self.feed.request_timeout_ms, self.poller.interval_ms
            )));
        }
        self.feed
            .price_id
            .parse::<crate::common::PriceFeedId>()
            .map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// 监听地址，如 `0.0.0.0:3000`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.poller.interval_ms, 5_000);
        assert_eq!(config.feed.base_url, "https://hermes.pyth.network");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_must_be_below_interval() {
        let mut config = AppConfig::default();
        config.feed.request_timeout_ms = config.poller.interval_ms;
        assert!(config.validate().is_err());

        config.poller.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_price_id_rejected() {
        let mut config = AppConfig::default();
        config.feed.price_id = "btc-usd".to_string();
        assert!(config.validate().is_err());
    }
}
