//! PrismLog - 结构化日志门面
//!
//! PrismLog 由声明式选项构建一个不可变的 [`Logger`]，每条日志被编码为一行
//! JSON 并扇出到所有配置的写入器：控制台、追加写文件以及 InfluxDB v2。
//! InfluxDB 写入器会把事件分类为带 tag 与 field 的数据点。
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use prism_log::{LogLevel, LoggerFactory, WriterKind};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let logger = LoggerFactory::default()
//!         .with_level(LogLevel::Debug)
//!         .with_service_name("billing")
//!         .with_writers(&[WriterKind::Console, WriterKind::File])
//!         .await?
//!         .build();
//!
//!     logger.debug("hello");
//!     logger.with_scope("db").infov("connected", &[json!("pool"), json!(8)]);
//!
//!     logger.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # 从配置文件构建
//!
//! ```rust,no_run
//! use prism_log::{load_config_from_file, LoggerFactory};
//!
//! # async fn run() -> prism_log::Result<()> {
//! let config = load_config_from_file(std::path::Path::new("prism_log.toml"))?;
//! let logger = LoggerFactory::build_from_config(&config).await?;
//! logger.info("configured");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod env_config;
pub mod error;
pub mod sinks;

// 重新导出主要类型
pub use config::{
    load_config_from_file, load_config_from_str, ConsoleConfig, InfluxConfig, InfluxOptions,
    LoggerConfig,
};
pub use diagnostics::{get_diagnostics, DiagnosticsSnapshot};
pub use error::{PrismLogError, Result};

// 重新导出核心功能
pub use core::event::LogEvent;
pub use core::factory::LoggerFactory;
pub use core::level::{LogLevel, LoggerType, WriterKind};
pub use core::logger::Logger;

// 重新导出 sink 接口
pub use sinks::{
    FallbackErrorObserver, LogWriter, SinkError, SinkMetadata, SinkResult, WriteErrorObserver,
};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reexports() {
        let logger = LoggerFactory::new(LoggerType::Json)
            .with_level(LogLevel::Error)
            .build();
        assert!(logger.enabled(LogLevel::Fatal));
        assert!(!logger.enabled(LogLevel::Warn));
    }
}
