//! PrismLog 核心模块
//!
//! 本模块包含事件定义、级别、logger 及其构建器。

pub mod event;
pub mod factory;
pub mod level;
pub mod logger;

// 重新导出核心类型
pub use event::LogEvent;
pub use factory::LoggerFactory;
pub use level::{LogLevel, LoggerType, WriterKind};
pub use logger::{check_key_values, Logger};
