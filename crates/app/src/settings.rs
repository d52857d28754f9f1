use config::{Config, ConfigError, Environment, File};
use hikari_core::config::AppConfig;

/// 默认配置文件（不含扩展名，可缺省）
const DEFAULT_CONFIG_FILE: &str = "config/default";

/// # Summary
/// 加载进程配置。
///
/// # Logic
/// 1. 代码内默认值。
/// 2. 可选的 `config/default.toml`。
/// 3. `HIKARI__` 前缀的环境变量，层级以 `__` 分隔，例如 `HIKARI__POLLER__INTERVAL_MS`。
/// 4. 裸 `PORT` 环境变量覆盖监听端口。
pub fn load() -> Result<AppConfig, ConfigError> {
    build(DEFAULT_CONFIG_FILE, std::env::var("PORT").ok())
}

pub(crate) fn build(file: &str, port: Option<String>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("HIKARI")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    if let Some(port) = port {
        builder = builder.set_override("server.port", port)?;
    }

    builder.build()?.try_deserialize()
}
