//! 环境变量配置模块
//!
//! 从环境变量读取 InfluxDB 连接参数。缺失的变量被视为空字符串，
//! 连接参数是否可用留到首次健康检查时判定。

use std::env;

/// InfluxDB 地址
pub const INFLUX_ADDRESS_VAR: &str = "INFLUX_ADDRESS";
/// InfluxDB 认证 token
pub const INFLUX_TOKEN_VAR: &str = "INFLUX_TOKEN";
/// InfluxDB 组织
pub const INFLUX_ORGANIZATION_VAR: &str = "INFLUX_ORGANIZATION";
/// InfluxDB bucket
pub const INFLUX_BUCKET_VAR: &str = "INFLUX_BUCKET";

/// 环境变量配置管理器
pub struct EnvConfig;

impl EnvConfig {
    /// 从环境变量读取 InfluxDB 地址
    pub fn get_influx_address() -> String {
        Self::var_or_empty(INFLUX_ADDRESS_VAR)
    }

    /// 从环境变量读取 InfluxDB token
    pub fn get_influx_token() -> String {
        Self::var_or_empty(INFLUX_TOKEN_VAR)
    }

    /// 从环境变量读取 InfluxDB 组织名
    pub fn get_influx_organization() -> String {
        Self::var_or_empty(INFLUX_ORGANIZATION_VAR)
    }

    /// 从环境变量读取 InfluxDB bucket 名
    pub fn get_influx_bucket() -> String {
        Self::var_or_empty(INFLUX_BUCKET_VAR)
    }

    /// 四个连接参数是否都已设置且非空
    pub fn has_influx_config() -> bool {
        [
            INFLUX_ADDRESS_VAR,
            INFLUX_TOKEN_VAR,
            INFLUX_ORGANIZATION_VAR,
            INFLUX_BUCKET_VAR,
        ]
        .iter()
        .all(|name| !Self::var_or_empty(name).is_empty())
    }

    fn var_or_empty(name: &str) -> String {
        env::var(name).unwrap_or_default()
    }
}
