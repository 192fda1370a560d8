//! 日志级别与写入器类型
//!
//! 两者都是封闭枚举：不受支持的取值在解析配置时就被拒绝，
//! 而不是在之后的某次日志调用中才暴露出来。

use crate::error::{PrismLogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 日志级别
///
/// 数值与排序遵循严重程度：`Trace` (-1) 最低，`Panic` (5) 最高。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[repr(i8)]
pub enum LogLevel {
    Trace = -1,
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
    Panic = 5,
}

impl LogLevel {
    /// 所有级别，按严重程度升序
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Panic,
    ];

    /// 事件中 `level` 字段使用的小写名称
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
        }
    }

    /// 控制台输出使用的三字母缩写
    pub fn abbreviation(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRC",
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WRN",
            LogLevel::Error => "ERR",
            LogLevel::Fatal => "FTL",
            LogLevel::Panic => "PNC",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = PrismLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            "panic" => Ok(LogLevel::Panic),
            _ => Err(PrismLogError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = PrismLogError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<i8> for LogLevel {
    type Error = PrismLogError;

    fn try_from(value: i8) -> Result<Self> {
        LogLevel::ALL
            .into_iter()
            .find(|level| *level as i8 == value)
            .ok_or_else(|| PrismLogError::InvalidLogLevel(value.to_string()))
    }
}

/// 写入器类型，决定工厂实例化哪一种 sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum WriterKind {
    /// 标准输出
    Console,
    /// `<日志目录>/<服务名>.log`
    File,
    /// InfluxDB 时序数据库
    Database,
}

impl WriterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriterKind::Console => "console",
            WriterKind::File => "file",
            WriterKind::Database => "database",
        }
    }
}

impl fmt::Display for WriterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriterKind {
    type Err = PrismLogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" | "stdout" => Ok(WriterKind::Console),
            "file" => Ok(WriterKind::File),
            "database" | "influxdb" => Ok(WriterKind::Database),
            _ => Err(PrismLogError::InvalidWriterKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for WriterKind {
    type Error = PrismLogError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// 事件引擎类型
///
/// 目前只有 JSON 引擎：每个事件被编码为一行紧凑的 JSON。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerType {
    #[default]
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Error < LogLevel::Fatal);
        assert!(LogLevel::Fatal < LogLevel::Panic);
        assert_eq!(LogLevel::Trace as i8, -1);
        assert_eq!(LogLevel::Panic as i8, 5);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(PrismLogError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_level_from_i8() {
        assert_eq!(LogLevel::try_from(-1i8).unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::try_from(3i8).unwrap(), LogLevel::Error);
        assert!(LogLevel::try_from(6i8).is_err());
        assert!(LogLevel::try_from(-2i8).is_err());
    }

    #[test]
    fn test_level_serde() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }

        let w: Wrapper = toml::from_str("level = \"Error\"").unwrap();
        assert_eq!(w.level, LogLevel::Error);
        assert!(toml::from_str::<Wrapper>("level = \"loud\"").is_err());
        assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
    }

    #[test]
    fn test_writer_kind_parse() {
        assert_eq!("console".parse::<WriterKind>().unwrap(), WriterKind::Console);
        assert_eq!("InfluxDB".parse::<WriterKind>().unwrap(), WriterKind::Database);
        assert!(matches!(
            "syslog".parse::<WriterKind>(),
            Err(PrismLogError::InvalidWriterKind(_))
        ));
        assert_eq!(WriterKind::File.to_string(), "file");
    }
}
