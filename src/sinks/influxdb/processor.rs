//! InfluxDB 批处理器
//!
//! 后台任务：从通道接收数据点，攒批后写入。批次满或定时器到期时刷新，
//! 通道关闭时刷新剩余数据后退出。写入失败不重试，整批丢弃，
//! 错误连同丢弃的点数交给排错任务。

use crate::diagnostics;
use crate::error::PrismLogError;
use crate::sinks::influxdb::client::InfluxClient;
use crate::sinks::influxdb::point::Point;

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 待写入的一批行协议
#[derive(Debug, Default)]
struct PointBatch {
    lines: Vec<String>,
}

impl PointBatch {
    fn push(&mut self, point: &Point) {
        self.lines.push(point.to_line_protocol());
    }

    fn is_full(&self, max_size: usize) -> bool {
        self.lines.len() >= max_size
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    /// 取出所有行并拼接为请求体
    fn take_body(&mut self) -> String {
        std::mem::take(&mut self.lines).join("\n")
    }
}

/// InfluxDB 处理器
pub(crate) struct InfluxProcessor {
    client: InfluxClient,
    batch_size: usize,
    flush_interval: Duration,
    errors: mpsc::UnboundedSender<PrismLogError>,
}

impl InfluxProcessor {
    pub(crate) fn new(
        client: InfluxClient,
        batch_size: usize,
        flush_interval: Duration,
        errors: mpsc::UnboundedSender<PrismLogError>,
    ) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
            flush_interval,
            errors,
        }
    }

    /// 运行处理器，直到发送端全部关闭
    pub(crate) async fn run(self, mut receiver: mpsc::UnboundedReceiver<Point>) {
        let mut batch = PointBatch::default();
        let mut ticker = interval(self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("InfluxDB processor started");

        loop {
            tokio::select! {
                point = receiver.recv() => {
                    match point {
                        Some(point) => {
                            batch.push(&point);
                            if batch.is_full(self.batch_size) {
                                self.flush(&mut batch).await;
                            }
                        }
                        None => {
                            debug!("InfluxDB point channel closed");
                            self.flush(&mut batch).await;
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.flush(&mut batch).await;
                }
            }
        }

        info!("InfluxDB processor stopped");
    }

    async fn flush(&self, batch: &mut PointBatch) {
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        match self.client.write(batch.take_body()).await {
            Ok(()) => {
                debug!("Wrote {} point(s) to InfluxDB", count);
                diagnostics::diagnostics().record_batch_write(count as u64);
            }
            Err(e) => {
                warn!("InfluxDB write failed, dropping {} point(s): {}", count, e);
                diagnostics::diagnostics().record_batch_dropped(count as u64);
                // 排错任务已退出时只能丢弃
                let _ = self
                    .errors
                    .send(PrismLogError::batch_dropped(count, e.to_string()));
            }
        }
    }
}
