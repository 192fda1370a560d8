//! 定义 PrismLog 日志门面的内部诊断与指标。
//!
//! 此模块提供了对日志系统健康状况的可观测性，尤其是那些不会
//! 中断调用方的失败：单个 sink 写入失败、事件解码失败、后端异步写入失败。

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 内部诊断与指标数据结构。
///
/// 使用原子操作确保线程安全。
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// 系统启动时间
    start_time: Option<Instant>,

    /// 已序列化并分发的事件数
    events_emitted: AtomicU64,

    /// 至少有一个 sink 写入失败的事件数
    events_failed: AtomicU64,

    /// 单个 sink 的写入失败次数
    sink_errors: AtomicU64,

    /// 时序 sink 解码失败次数
    decode_errors: AtomicU64,

    /// 已提交给 InfluxDB 处理器的点数
    points_submitted: AtomicU64,

    /// 已成功写入 InfluxDB 的点数
    points_written: AtomicU64,

    /// 因批量写入失败而丢弃的点数
    points_dropped: AtomicU64,

    /// InfluxDB 批量写入次数
    batch_writes: AtomicU64,

    /// InfluxDB 异步写入错误次数
    async_write_errors: AtomicU64,
}

/// 诊断数据的快照，用于外部查询。
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsSnapshot {
    pub uptime: Option<Duration>,
    pub events_emitted: u64,
    pub events_failed: u64,
    pub sink_errors: u64,
    pub decode_errors: u64,
    pub points_submitted: u64,
    pub points_written: u64,
    pub points_dropped: u64,
    pub batch_writes: u64,
    pub async_write_errors: u64,
}

impl Diagnostics {
    /// 创建新的诊断实例。
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn increment_events_emitted(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_failed(&self) {
        self.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_sink_errors(&self, count: u64) {
        self.sink_errors.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_points_submitted(&self) {
        self.points_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次成功的批量写入。
    pub fn record_batch_write(&self, points: u64) {
        self.batch_writes.fetch_add(1, Ordering::Relaxed);
        self.points_written.fetch_add(points, Ordering::Relaxed);
    }

    /// 记录一次失败的批量写入，整批点被丢弃。
    pub fn record_batch_dropped(&self, points: u64) {
        self.points_dropped.fetch_add(points, Ordering::Relaxed);
    }

    pub fn increment_async_write_errors(&self) {
        self.async_write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// 获取诊断数据的快照。
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            uptime: self.start_time.map(|start| start.elapsed()),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            events_failed: self.events_failed.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            points_submitted: self.points_submitted.load(Ordering::Relaxed),
            points_written: self.points_written.load(Ordering::Relaxed),
            points_dropped: self.points_dropped.load(Ordering::Relaxed),
            batch_writes: self.batch_writes.load(Ordering::Relaxed),
            async_write_errors: self.async_write_errors.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器（主要用于测试）。
    pub fn reset(&self) {
        self.events_emitted.store(0, Ordering::Relaxed);
        self.events_failed.store(0, Ordering::Relaxed);
        self.sink_errors.store(0, Ordering::Relaxed);
        self.decode_errors.store(0, Ordering::Relaxed);
        self.points_submitted.store(0, Ordering::Relaxed);
        self.points_written.store(0, Ordering::Relaxed);
        self.points_dropped.store(0, Ordering::Relaxed);
        self.batch_writes.store(0, Ordering::Relaxed);
        self.async_write_errors.store(0, Ordering::Relaxed);
    }
}

/// 全局诊断实例
static GLOBAL_DIAGNOSTICS: Lazy<Arc<Diagnostics>> = Lazy::new(|| Arc::new(Diagnostics::new()));

/// 获取全局诊断实例。
pub fn diagnostics() -> Arc<Diagnostics> {
    GLOBAL_DIAGNOSTICS.clone()
}

/// 获取全局诊断数据的快照。
pub fn get_diagnostics() -> DiagnosticsSnapshot {
    GLOBAL_DIAGNOSTICS.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_snapshot() {
        let diag = Diagnostics::new();
        diag.increment_events_emitted();
        diag.increment_events_emitted();
        diag.increment_events_failed();
        diag.add_sink_errors(2);
        diag.increment_decode_errors();
        diag.increment_points_submitted();
        diag.record_batch_write(5);
        diag.record_batch_dropped(4);
        diag.increment_async_write_errors();

        let snapshot = diag.snapshot();
        assert_eq!(snapshot.events_emitted, 2);
        assert_eq!(snapshot.events_failed, 1);
        assert_eq!(snapshot.sink_errors, 2);
        assert_eq!(snapshot.decode_errors, 1);
        assert_eq!(snapshot.points_submitted, 1);
        assert_eq!(snapshot.points_written, 5);
        assert_eq!(snapshot.points_dropped, 4);
        assert_eq!(snapshot.batch_writes, 1);
        assert_eq!(snapshot.async_write_errors, 1);
        assert!(snapshot.uptime.is_some());
    }

    #[test]
    fn test_reset() {
        let diag = Diagnostics::new();
        diag.increment_events_emitted();
        diag.record_batch_write(3);
        diag.record_batch_dropped(2);
        diag.reset();

        let snapshot = diag.snapshot();
        assert_eq!(snapshot.events_emitted, 0);
        assert_eq!(snapshot.points_written, 0);
        assert_eq!(snapshot.batch_writes, 0);
        assert_eq!(snapshot.points_dropped, 0);
    }

    #[test]
    fn test_global_instance_is_shared() {
        let a = diagnostics();
        let b = diagnostics();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
