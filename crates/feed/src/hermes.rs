use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use hikari_core::common::PriceFeedId;
use hikari_core::config::FeedConfig;
use hikari_core::price::entity::OracleQuote;
use hikari_core::price::error::FeedError;
use hikari_core::price::port::PriceSource;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// Pyth Hermes 价格源实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，超时在客户端层面统一设置。
/// - 只查询构造时指定的单一价格源。
#[derive(Clone)]
pub struct HermesProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// Hermes 根地址，不带末尾斜杠
    base_url: String,
    /// 目标价格源
    feed_id: PriceFeedId,
    /// 请求超时（毫秒），用于错误信息
    timeout_ms: u64,
}

impl HermesProvider {
    /// # Summary
    /// 根据配置创建一个新的 HermesProvider 实例。
    ///
    /// # Logic
    /// 1. 确保进程级 rustls 加密后端已安装。
    /// 2. 以配置中的超时时间构建 reqwest 客户端。
    /// 3. 规范化根地址与价格源 ID。
    ///
    /// # Arguments
    /// * `config`: 价格源配置。
    ///
    /// # Returns
    /// 成功返回 HermesProvider，客户端构建失败或 ID 非法返回 `FeedError`。
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        ensure_crypto_provider();

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("hikari/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let feed_id = config
            .price_id
            .parse::<PriceFeedId>()
            .map_err(FeedError::Parse)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            feed_id,
            timeout_ms: config.request_timeout_ms,
        })
    }

    /// 当前查询的价格源
    pub fn feed_id(&self) -> &PriceFeedId {
        &self.feed_id
    }
}

fn ensure_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// # Summary
/// Hermes `/v2/updates/price/latest` 响应顶层结构。
#[derive(Deserialize, Debug)]
struct HermesLatestResponse {
    // 解析后的价格更新列表，`parsed=true` 时返回
    #[serde(default)]
    parsed: Option<Vec<HermesParsedUpdate>>,
}

/// # Summary
/// 单个价格源的解析结果。
#[derive(Deserialize, Debug)]
struct HermesParsedUpdate {
    // 价格源 ID，不带 0x 前缀
    id: String,
    price: HermesPrice,
}

/// # Summary
/// Hermes 原始价格结构，整数字段以字符串形式传输。
#[derive(Deserialize, Debug)]
struct HermesPrice {
    price: String,
    conf: String,
    expo: i32,
    publish_time: i64,
}

/// # Summary
/// 从响应中提取目标价格源的报价。
///
/// # Logic
/// 1. `parsed` 缺失或为空视为 NotFound。
/// 2. 按 ID 匹配目标价格源（忽略前缀与大小写）。
/// 3. 将字符串形式的整数解析为 `i64` / `u64`。
fn extract_quote(
    response: HermesLatestResponse,
    feed_id: &PriceFeedId,
) -> Result<OracleQuote, FeedError> {
    let update = response
        .parsed
        .unwrap_or_default()
        .into_iter()
        .find(|u| feed_id.matches(&u.id))
        .ok_or(FeedError::NotFound)?;

    let price = update
        .price
        .price
        .parse::<i64>()
        .map_err(|e| FeedError::Parse(format!("price '{}': {}", update.price.price, e)))?;
    let conf = update
        .price
        .conf
        .parse::<u64>()
        .map_err(|e| FeedError::Parse(format!("conf '{}': {}", update.price.conf, e)))?;

    Ok(OracleQuote {
        price,
        conf,
        expo: update.price.expo,
        publish_time: publish_time(update.price.publish_time),
    })
}

fn publish_time(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[async_trait]
impl PriceSource for HermesProvider {
    /// # Summary
    /// 从 Hermes 抓取最新报价。
    ///
    /// # Logic
    /// 1. 构建带 `ids[]` 与 `parsed=true` 的请求。
    /// 2. 超时映射为 `FeedError::Timeout`，其余传输错误映射为 `Network`。
    /// 3. 非 2xx 状态映射为 `Upstream`。
    /// 4. 解析 JSON 并提取目标价格源。
    ///
    /// # Returns
    /// 成功返回原始报价，失败返回 `FeedError`。
    async fn fetch_latest(&self) -> Result<OracleQuote, FeedError> {
        let url = format!("{}/v2/updates/price/latest", self.base_url);
        let id = self.feed_id.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[("ids[]", id.as_str()), ("parsed", "true")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::Timeout(self.timeout_ms)
                } else {
                    FeedError::Network(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(FeedError::Upstream(format!("HTTP {}", resp.status())));
        }

        let json: HermesLatestResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(self.timeout_ms)
            } else {
                FeedError::Parse(e.to_string())
            }
        })?;

        extract_quote(json, &self.feed_id)
    }

    fn name(&self) -> &str {
        "pyth-hermes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTC: &str = "e62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43";

    fn parse(body: &str) -> HermesLatestResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_extract_matching_feed() {
        let body = format!(
            r#"{{
                "binary": {{ "encoding": "hex", "data": ["00"] }},
                "parsed": [{{
                    "id": "{BTC}",
                    "price": {{ "price": "6512345678901", "conf": "2345678901", "expo": -8, "publish_time": 1714564800 }},
                    "ema_price": {{ "price": "6500000000000", "conf": "2000000000", "expo": -8, "publish_time": 1714564800 }},
                    "metadata": {{ "slot": 1, "proof_available_time": 1714564801, "prev_publish_time": 1714564799 }}
                }}]
            }}"#
        );

        let quote = extract_quote(parse(&body), &PriceFeedId::new(&format!("0x{BTC}"))).unwrap();
        assert_eq!(quote.price, 6_512_345_678_901);
        assert_eq!(quote.conf, 2_345_678_901);
        assert_eq!(quote.expo, -8);
        assert_eq!(
            quote.publish_time.map(|t| t.timestamp()),
            Some(1_714_564_800)
        );
    }

    #[test]
    fn test_missing_or_other_feed_is_not_found() {
        let feed = PriceFeedId::new(BTC);
        assert_eq!(
            extract_quote(parse(r#"{"parsed": []}"#), &feed),
            Err(FeedError::NotFound)
        );
        assert_eq!(extract_quote(parse("{}"), &feed), Err(FeedError::NotFound));

        let other = r#"{"parsed": [{"id": "ff61491a", "price": {"price": "1", "conf": "1", "expo": 0, "publish_time": 0}}]}"#;
        assert_eq!(extract_quote(parse(other), &feed), Err(FeedError::NotFound));
    }

    #[test]
    fn test_non_numeric_price_is_parse_error() {
        let body = format!(
            r#"{{"parsed": [{{"id": "{BTC}", "price": {{"price": "abc", "conf": "1", "expo": -8, "publish_time": 0}}}}]}}"#
        );
        assert!(matches!(
            extract_quote(parse(&body), &PriceFeedId::new(BTC)),
            Err(FeedError::Parse(_))
        ));
    }
}
