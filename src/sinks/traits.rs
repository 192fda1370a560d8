//! PrismLog Sink Traits
//!
//! 定义了统一的写入器接口。核心只要求 sink 具备一种能力：
//! 接收一条序列化好的事件字节，返回写入的字节数或错误。
//! 新的 sink 类型只需实现 [`LogWriter`]，无需修改 logger 或分类器。
//!
//! # 使用示例
//!
//! ```rust
//! use prism_log::sinks::traits::{LogWriter, SinkMetadata, SinkResult};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct CountingSink;
//!
//! #[async_trait]
//! impl LogWriter for CountingSink {
//!     fn write(&self, event: &[u8]) -> SinkResult<usize> {
//!         Ok(event.len())
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "counting"
//!     }
//!
//!     fn metadata(&self) -> SinkMetadata {
//!         SinkMetadata::new("counting".to_string())
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::fmt::{self, Debug};

/// 基础写入器 trait
///
/// `write` 在调用方线程上同步执行；生命周期相关的操作是异步的。
#[async_trait]
pub trait LogWriter: Send + Sync + Debug {
    /// 写入一条序列化好的事件
    ///
    /// # 返回值
    ///
    /// 成功时返回写入的字节数
    fn write(&self, event: &[u8]) -> SinkResult<usize>;

    /// 优雅关闭 sink
    ///
    /// 此方法应该确保所有待处理的数据都被正确处理，并释放相关资源。
    async fn shutdown(&self) -> SinkResult<()> {
        Ok(())
    }

    /// 检查 sink 是否健康
    async fn is_healthy(&self) -> bool {
        true
    }

    /// 获取 sink 的名称
    fn name(&self) -> &'static str;

    /// 获取 sink 的元数据
    fn metadata(&self) -> SinkMetadata;
}

/// Sink 元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkMetadata {
    /// Sink 名称
    pub name: String,
    /// 是否启用
    pub enabled: bool,
    /// 描述信息
    pub description: Option<String>,
}

impl SinkMetadata {
    /// 创建新的 sink 元数据
    pub fn new(name: String) -> Self {
        Self {
            name,
            enabled: true,
            description: None,
        }
    }

    /// 设置描述信息
    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// 设置启用状态
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// 扇出时单个 sink 的失败记录
#[derive(Debug)]
pub struct SinkFailure {
    /// 失败的 sink 名称
    pub sink: &'static str,
    /// 失败原因
    pub error: SinkError,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sink, self.error)
    }
}

/// 通用 Sink 错误类型
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O 错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 网络错误
    #[error("Network error: {0}")]
    Network(String),

    /// 通用错误
    #[error("Generic error: {0}")]
    Generic(String),

    /// Sink 已关闭
    #[error("Sink is closed")]
    Closed,

    /// 扇出时一个或多个 sink 失败
    #[error("{} sink(s) failed: {}", .0.len(), join_failures(.0))]
    Fanout(Vec<SinkFailure>),
}

fn join_failures(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for SinkError {
    fn from(error: serde_json::Error) -> Self {
        SinkError::Serialization(error.to_string())
    }
}

/// Sink 结果类型
pub type SinkResult<T> = Result<T, SinkError>;
