//! PrismLog Sinks 模块
//!
//! 每个 sink 只需要一种能力：接收序列化好的事件字节并返回成功或失败。
//!
//! - [`ConsoleSink`]：人类可读的单行渲染
//! - [`FileSink`]：原始 JSON 追加写入
//! - [`InfluxDBSink`]：分类为数据点后异步批量写入
//! - [`Pipeline`]：把同一事件扇出到所有 sink

pub mod console;
pub mod file;
pub mod influxdb;
pub mod pipeline;
pub mod traits;

// 重新导出主要类型
pub use console::ConsoleSink;
pub use file::FileSink;
pub use influxdb::{FallbackErrorObserver, FieldValue, InfluxDBSink, Point, WriteErrorObserver};
pub use pipeline::Pipeline;
pub use traits::{LogWriter, SinkError, SinkFailure, SinkMetadata, SinkResult};
