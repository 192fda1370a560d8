//! 追加写文件 Sink
//!
//! 事件字节原样追加到 `<log directory>/<service>.log`。文件以追加模式打开，
//! 每条事件一次 `write_all`，依赖操作系统的 O_APPEND 语义，不加锁。
//! 不做轮转。

use crate::error::{PrismLogError, Result};
use crate::sinks::traits::{LogWriter, SinkError, SinkMetadata, SinkResult};

use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 文件权限
#[cfg(unix)]
const LOG_FILE_MODE: u32 = 0o644;

/// 追加写文件 Sink
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    /// 在 `directory` 下打开 `<service_name>.log`
    ///
    /// 目录不存在时自动创建。服务名为空、含路径分隔符或文件无法打开时返回错误。
    pub fn open(directory: impl AsRef<Path>, service_name: &str) -> Result<Self> {
        if service_name.trim().is_empty() {
            return Err(PrismLogError::config(
                "file writer requires a non-empty service name",
            ));
        }
        if service_name.contains(['/', '\\']) || matches!(service_name, "." | "..") {
            return Err(PrismLogError::config(format!(
                "service name '{}' must not contain path separators",
                service_name
            )));
        }

        let directory = directory.as_ref();
        if !directory.exists() {
            fs::create_dir_all(directory)?;
            debug!("Created log directory: {}", directory.display());
        }

        let path = directory.join(format!("{}.log", service_name));
        let file = Self::open_append(&path)?;

        info!("FileSink opened: {}", path.display());
        Ok(Self { path, file })
    }

    #[cfg(unix)]
    fn open_append(path: &Path) -> std::io::Result<File> {
        use std::os::unix::fs::OpenOptionsExt;

        OpenOptions::new()
            .create(true)
            .append(true)
            .mode(LOG_FILE_MODE)
            .open(path)
    }

    #[cfg(not(unix))]
    fn open_append(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    /// 日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogWriter for FileSink {
    fn write(&self, event: &[u8]) -> SinkResult<usize> {
        (&self.file).write_all(event)?;
        Ok(event.len())
    }

    async fn shutdown(&self) -> SinkResult<()> {
        self.file.sync_all().map_err(SinkError::Io)?;
        debug!("FileSink shutdown completed: {}", self.path.display());
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.path.exists()
    }

    fn name(&self) -> &'static str {
        "file"
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("file".to_string())
            .with_description(format!("Append-only file: {}", self.path.display()))
    }
}
