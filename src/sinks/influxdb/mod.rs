//! InfluxDB v2 时序 Sink
//!
//! - [`point`]：事件分类与行协议编码
//! - [`client`]：HTTP 端点
//! - [`processor`]：后台攒批写入
//! - [`sink`]：[`LogWriter`](crate::sinks::traits::LogWriter) 实现与错误观察者

pub mod client;
pub mod point;
pub(crate) mod processor;
pub mod sink;

pub use client::{normalize_address, InfluxClient};
pub use point::{FieldValue, Point, MEASUREMENT};
pub use sink::{FallbackErrorObserver, InfluxDBSink, WriteErrorObserver};
