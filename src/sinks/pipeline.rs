//! PrismLog Pipeline
//!
//! 管道把一条事件原样扇出到所有写入器：
//! - 写入顺序即配置顺序，但不代表优先级，每个写入器收到相同的字节
//! - 某个写入器失败不会阻止后续写入器收到事件，失败被汇总后统一返回
//! - 构建完成后写入器集合固定不变

use crate::diagnostics;
use crate::sinks::traits::{LogWriter, SinkError, SinkFailure, SinkMetadata, SinkResult};

use std::sync::Arc;
use tracing::{debug, warn};

/// 管道实现
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    writers: Vec<Arc<dyn LogWriter>>,
}

impl Pipeline {
    /// 以固定的写入器集合创建管道
    pub fn new(writers: Vec<Arc<dyn LogWriter>>) -> Self {
        debug!("Pipeline created with {} writer(s)", writers.len());
        Self { writers }
    }

    /// 把事件写入所有写入器
    ///
    /// 全部成功时返回事件长度；否则返回 [`SinkError::Fanout`]，
    /// 其中只包含失败的写入器。
    pub fn write(&self, event: &[u8]) -> SinkResult<usize> {
        let mut failures = Vec::new();

        for writer in &self.writers {
            if let Err(error) = writer.write(event) {
                failures.push(SinkFailure {
                    sink: writer.name(),
                    error,
                });
            }
        }

        let diag = diagnostics::diagnostics();
        diag.increment_events_emitted();

        if failures.is_empty() {
            Ok(event.len())
        } else {
            diag.increment_events_failed();
            diag.add_sink_errors(failures.len() as u64);
            Err(SinkError::Fanout(failures))
        }
    }

    /// 关闭所有写入器，失败同样被汇总
    pub async fn shutdown(&self) -> SinkResult<()> {
        let mut failures = Vec::new();

        for writer in &self.writers {
            if let Err(error) = writer.shutdown().await {
                warn!("Error shutting down sink '{}': {}", writer.name(), error);
                failures.push(SinkFailure {
                    sink: writer.name(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            debug!("Pipeline shutdown completed");
            Ok(())
        } else {
            Err(SinkError::Fanout(failures))
        }
    }

    /// 所有写入器是否健康
    pub async fn is_healthy(&self) -> bool {
        for writer in &self.writers {
            if !writer.is_healthy().await {
                return false;
            }
        }
        true
    }

    /// 写入器数量
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// 各写入器的元数据，按扇出顺序
    pub fn metadata(&self) -> Vec<SinkMetadata> {
        self.writers.iter().map(|writer| writer.metadata()).collect()
    }
}
