//! InfluxDB Sink
//!
//! `write` 在调用方线程上完成解码和分类，然后把数据点放入无界通道，
//! 不做任何网络 I/O。后台有两个任务：
//!
//! - 处理器：攒批写入 `/api/v2/write`
//! - 排错任务：把异步写入错误逐个交给 [`WriteErrorObserver`]
//!
//! 后端错误不会终止进程。

use crate::config::{InfluxConfig, InfluxOptions};
use crate::core::event::decode_event;
use crate::diagnostics;
use crate::error::{PrismLogError, Result};
use crate::sinks::influxdb::client::InfluxClient;
use crate::sinks::influxdb::point::Point;
use crate::sinks::influxdb::processor::InfluxProcessor;
use crate::sinks::traits::{LogWriter, SinkError, SinkMetadata, SinkResult};

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 关闭时等待处理器刷新剩余数据的上限
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// 接收后台写入错误
pub trait WriteErrorObserver: Send + Sync {
    fn on_write_error(&self, error: &PrismLogError);
}

impl<F> WriteErrorObserver for F
where
    F: Fn(&PrismLogError) + Send + Sync,
{
    fn on_write_error(&self, error: &PrismLogError) {
        self(error)
    }
}

/// 默认观察者：输出到标准错误
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackErrorObserver;

impl WriteErrorObserver for FallbackErrorObserver {
    fn on_write_error(&self, error: &PrismLogError) {
        eprintln!("prism_log: InfluxDB write failed: {}", error);
    }
}

/// InfluxDB Sink
pub struct InfluxDBSink {
    base_url: String,
    sender: Mutex<Option<mpsc::UnboundedSender<Point>>>,
    processor_handle: Mutex<Option<JoinHandle<()>>>,
    drain_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl InfluxDBSink {
    /// 健康检查通过后启动后台任务
    ///
    /// 必须在 tokio 运行时中调用。
    pub async fn connect(
        config: InfluxConfig,
        options: InfluxOptions,
        observer: Arc<dyn WriteErrorObserver>,
    ) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(PrismLogError::config("influxdb batch_size must be > 0"));
        }
        if options.flush_interval_ms == 0 {
            return Err(PrismLogError::config("influxdb flush_interval_ms must be > 0"));
        }

        let client = InfluxClient::new(&config, &options)?;
        client.health().await?;
        client.ping().await?;

        let base_url = client.base_url().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (error_sender, error_receiver) = mpsc::unbounded_channel();

        let processor = InfluxProcessor::new(
            client,
            options.batch_size,
            Duration::from_millis(options.flush_interval_ms),
            error_sender,
        );
        let processor_handle = tokio::spawn(processor.run(receiver));

        let cancel = CancellationToken::new();
        let drain_handle = tokio::spawn(drain_errors(error_receiver, observer, cancel.clone()));

        info!("InfluxDB Sink connected: {}", base_url);
        Ok(Self {
            base_url,
            sender: Mutex::new(Some(sender)),
            processor_handle: Mutex::new(Some(processor_handle)),
            drain_handle: Mutex::new(Some(drain_handle)),
            cancel,
        })
    }

    /// 规范化后的服务地址
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 是否仍在接收数据点
    pub fn is_running(&self) -> bool {
        self.sender
            .lock()
            .map(|sender| sender.is_some())
            .unwrap_or(false)
    }
}

/// 等待处理器刷新剩余数据；超时或任务失败时返回错误
async fn join_processor(handle: JoinHandle<()>, limit: Duration) -> SinkResult<()> {
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            error!("InfluxDB processor task panicked: {}", e);
            Err(SinkError::Generic(format!("InfluxDB processor task failed: {}", e)))
        }
        Err(_) => {
            warn!("InfluxDB processor shutdown timeout");
            Err(SinkError::Generic(format!(
                "InfluxDB processor did not finish within {:?}, queued points lost",
                limit
            )))
        }
    }
}

async fn drain_errors(
    mut errors: mpsc::UnboundedReceiver<PrismLogError>,
    observer: Arc<dyn WriteErrorObserver>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            received = errors.recv() => match received {
                Some(e) => {
                    diagnostics::diagnostics().increment_async_write_errors();
                    observer.on_write_error(&e);
                }
                None => break,
            },

            _ = cancel.cancelled() => break,
        }
    }
}

#[async_trait]
impl LogWriter for InfluxDBSink {
    fn write(&self, event: &[u8]) -> SinkResult<usize> {
        let diag = diagnostics::diagnostics();

        let fields = decode_event(event).map_err(|e| {
            diag.increment_decode_errors();
            SinkError::Serialization(format!("cannot decode event: {}", e))
        })?;

        let point = Point::from_event(&fields);
        if !point.has_fields() {
            return Err(SinkError::Serialization(
                "event has no fields to write".to_string(),
            ));
        }

        let guard = self
            .sender
            .lock()
            .map_err(|_| SinkError::Generic("influxdb sender lock poisoned".to_string()))?;
        match guard.as_ref() {
            Some(sender) => sender.send(point).map_err(|_| SinkError::Closed)?,
            None => return Err(SinkError::Closed),
        }

        diag.increment_points_submitted();
        Ok(event.len())
    }

    async fn shutdown(&self) -> SinkResult<()> {
        // 关闭通道，处理器刷新剩余数据后退出
        let sender = self.sender.lock().ok().and_then(|mut s| s.take());
        drop(sender);

        let processor = self.processor_handle.lock().ok().and_then(|mut h| h.take());
        let flushed = match processor {
            Some(handle) => join_processor(handle, SHUTDOWN_TIMEOUT).await,
            None => Ok(()),
        };

        self.cancel.cancel();
        let drain = self.drain_handle.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = drain {
            if let Err(e) = handle.await {
                error!("InfluxDB error drain task panicked: {}", e);
            }
        }

        flushed?;
        info!("InfluxDB Sink shutdown completed");
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        self.is_running()
    }

    fn name(&self) -> &'static str {
        "influxdb"
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("influxdb".to_string())
            .with_enabled(self.is_running())
            .with_description(format!("InfluxDB v2 writer to {}", self.base_url))
    }
}

impl Drop for InfluxDBSink {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for InfluxDBSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxDBSink")
            .field("base_url", &self.base_url)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
