//! Error types for PrismLog
//!
//! This module defines the crate-level error type. Per-sink failures use
//! [`SinkError`](crate::sinks::SinkError) and are wrapped here when they cross
//! the factory or logger boundary.

use crate::sinks::traits::SinkError;
use thiserror::Error;

/// Main error type for PrismLog operations
#[derive(Error, Debug)]
pub enum PrismLogError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    ConfigFileMissing(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// Invalid writer kind
    #[error("Invalid writer kind: {0}")]
    InvalidWriterKind(String),

    /// 键值参数格式错误（奇数个参数或非字符串键）
    #[error("Invalid key/value arguments: {0}")]
    InvalidKeyValues(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    /// TOML parsing errors
    #[error("TOML parsing error: {source}")]
    TomlError {
        #[from]
        source: toml::de::Error,
    },

    /// Network-related errors
    #[error("Network error: {0}")]
    NetworkError(String),

    /// InfluxDB 健康检查或 ping 失败
    #[error("Health check failed: {0}")]
    HealthCheck(String),

    /// Sink-related errors
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// InfluxDB 批量写入失败，整批数据点被丢弃
    #[error("InfluxDB write dropped {points} point(s): {reason}")]
    BatchDropped { points: usize, reason: String },
}

/// Result type alias for PrismLog operations
pub type Result<T> = std::result::Result<T, PrismLogError>;

impl PrismLogError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Create a new health check error
    pub fn health_check<S: Into<String>>(msg: S) -> Self {
        Self::HealthCheck(msg.into())
    }

    /// Create a new dropped-batch error
    pub fn batch_dropped<S: Into<String>>(points: usize, reason: S) -> Self {
        Self::BatchDropped {
            points,
            reason: reason.into(),
        }
    }

    /// Number of points lost, if this error dropped any
    pub fn dropped_points(&self) -> Option<usize> {
        match self {
            Self::BatchDropped { points, .. } => Some(*points),
            _ => None,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Per-event and transport failures are recoverable; misconfiguration is not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::IoError { .. } => true,
            Self::SerializationError { .. } => true,
            Self::NetworkError(_) => true,
            Self::BatchDropped { .. } => true,
            Self::Sink(_) => true,
            Self::ConfigError(_)
            | Self::ConfigFileMissing(_)
            | Self::InvalidLogLevel(_)
            | Self::InvalidWriterKind(_)
            | Self::InvalidKeyValues(_)
            | Self::TomlError { .. }
            | Self::HealthCheck(_) => false,
        }
    }

    /// Get the error category for logging purposes
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigError(_)
            | Self::ConfigFileMissing(_)
            | Self::InvalidLogLevel(_)
            | Self::InvalidWriterKind(_)
            | Self::InvalidKeyValues(_) => "config",
            Self::IoError { .. } => "io",
            Self::SerializationError { .. } => "serialization",
            Self::TomlError { .. } => "toml",
            Self::NetworkError(_) | Self::HealthCheck(_) | Self::BatchDropped { .. } => "network",
            Self::Sink(_) => "sink",
        }
    }
}
