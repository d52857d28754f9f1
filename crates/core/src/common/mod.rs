pub mod time;

use std::str::FromStr;

/// # Summary
/// 预言机价格源标识，代表系统关注的唯一资产报价通道。
///
/// # Invariants
/// - 内部统一保存为不带 `0x` 前缀的小写十六进制串。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceFeedId(String);

impl PriceFeedId {
    /// # Summary
    /// 以规范化形式构造价格源标识。
    ///
    /// # Logic
    /// 1. 去除首尾空白。
    /// 2. 剥离可选的 `0x` / `0X` 前缀。
    /// 3. 转为小写。
    ///
    /// # Arguments
    /// * `raw`: 原始标识字符串。
    ///
    /// # Returns
    /// 规范化后的标识。
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        Self(hex.to_ascii_lowercase())
    }

    /// 不带前缀的十六进制串
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// 判断另一个（可能带前缀的）标识是否指向同一价格源
    pub fn matches(&self, other: &str) -> bool {
        Self::new(other) == *self
    }
}

impl FromStr for PriceFeedId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.0.is_empty() || !id.0.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid price feed id: {}", s));
        }
        Ok(id)
    }
}

impl std::fmt::Display for PriceFeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.as_hex())
    }
}
