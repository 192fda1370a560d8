//! 定义 PrismLog 日志门面的所有配置结构体。

use crate::core::level::{LogLevel, WriterKind};
use crate::env_config::EnvConfig;
use crate::error::{PrismLogError, Result};
use serde::Deserialize;
use std::path::PathBuf;

// --- 辅助函数，用于提供配置项的默认值 ---
fn default_false() -> bool {
    false
}
fn default_log_directory() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIRECTORY)
}
fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}
fn default_influx_batch_size() -> usize {
    100
}
fn default_influx_flush_interval_ms() -> u64 {
    1000
}
fn default_influx_request_timeout_seconds() -> u64 {
    10
}

/// 文件 sink 的默认日志目录
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// 控制台默认时间格式（RFC3339）
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// InfluxDB 连接参数
///
/// 不可变记录，没有默认值；空字符串合法，是否可用由健康检查判定。
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct InfluxConfig {
    address: String,
    auth_token: String,
    organization: String,
    bucket: String,
}

impl InfluxConfig {
    pub fn new(
        address: impl Into<String>,
        auth_token: impl Into<String>,
        organization: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            auth_token: auth_token.into(),
            organization: organization.into(),
            bucket: bucket.into(),
        }
    }

    /// 从 `INFLUX_ADDRESS`、`INFLUX_TOKEN`、`INFLUX_ORGANIZATION`、`INFLUX_BUCKET` 读取
    pub fn from_env() -> Self {
        Self::new(
            EnvConfig::get_influx_address(),
            EnvConfig::get_influx_token(),
            EnvConfig::get_influx_organization(),
            EnvConfig::get_influx_bucket(),
        )
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

// 安全的Debug实现，避免泄露敏感的认证信息
impl std::fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("address", &self.address)
            .field("auth_token", &"[REDACTED]")
            .field("organization", &self.organization)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// InfluxDB 批处理与超时选项
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InfluxOptions {
    /// 单批最多点数，达到即刷新
    #[serde(default = "default_influx_batch_size")]
    pub batch_size: usize,
    /// 定时刷新间隔（毫秒）
    #[serde(default = "default_influx_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// HTTP 请求超时（秒）
    #[serde(default = "default_influx_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for InfluxOptions {
    fn default() -> Self {
        Self {
            batch_size: default_influx_batch_size(),
            flush_interval_ms: default_influx_flush_interval_ms(),
            request_timeout_seconds: default_influx_request_timeout_seconds(),
        }
    }
}

/// 控制台 sink 配置
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// 是否着色；未设置时根据标准输出是否为终端决定
    #[serde(default)]
    pub color: Option<bool>,
    /// chrono 格式字符串
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            color: None,
            time_format: default_time_format(),
        }
    }
}

/// TOML 中的 `[influxdb]` 段：连接参数与批处理选项写在同一段
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InfluxSection {
    #[serde(flatten)]
    pub connection: InfluxConfig,
    #[serde(flatten)]
    pub options: InfluxOptions,
}

/// 完整的 logger 声明式配置
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub writers: Vec<WriterKind>,
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_false")]
    pub caller: bool,
    #[serde(default = "default_false")]
    pub stack_error: bool,
    #[serde(default)]
    pub console: ConsoleConfig,
    pub influxdb: Option<InfluxSection>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            service_name: String::new(),
            writers: Vec::new(),
            log_directory: default_log_directory(),
            caller: default_false(),
            stack_error: default_false(),
            console: ConsoleConfig::default(),
            influxdb: None,
        }
    }
}

/// 用于从 TOML 文件加载 `LoggerConfig` 的辅助函数。
pub fn load_config_from_file(path: &std::path::Path) -> Result<LoggerConfig> {
    if !path.exists() {
        return Err(PrismLogError::ConfigFileMissing(
            path.to_string_lossy().into_owned(),
        ));
    }

    let config_str = std::fs::read_to_string(path)?;
    load_config_from_str(&config_str)
}

/// 用于从 TOML 字符串加载 `LoggerConfig` 的辅助函数。
pub fn load_config_from_str(config_str: &str) -> Result<LoggerConfig> {
    let config: LoggerConfig = toml::from_str(config_str)?;
    validate_config(&config)?;
    Ok(config)
}

/// 验证配置的有效性。
pub fn validate_config(config: &LoggerConfig) -> Result<()> {
    if config.writers.contains(&WriterKind::File) && config.service_name.trim().is_empty() {
        return Err(PrismLogError::config(
            "file writer requires a non-empty service_name",
        ));
    }

    if let Some(influx) = &config.influxdb {
        if influx.options.batch_size == 0 {
            return Err(PrismLogError::config("influxdb.batch_size must be > 0"));
        }
        if influx.options.flush_interval_ms == 0 {
            return Err(PrismLogError::config(
                "influxdb.flush_interval_ms must be > 0",
            ));
        }
    }

    Ok(())
}
