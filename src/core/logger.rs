//! PrismLog Logger
//!
//! [`Logger`] 是不可变的：级别、写入器集合、服务名在构建后固定，
//! [`Logger::with_scope`] 返回共享同一内部状态的新值。
//!
//! 每个级别有三种调用形式：
//!
//! ```rust,no_run
//! # use prism_log::{LoggerFactory, LogLevel};
//! # use serde_json::json;
//! let logger = LoggerFactory::default().with_service_name("billing").build();
//! logger.info("started");
//! logger.infof(format_args!("listening on {}", 8080));
//! logger.infov("request", &[json!("user"), json!("alice"), json!("status"), json!(200)]);
//! ```

use crate::core::event::LogEvent;
use crate::core::level::LogLevel;
use crate::error::{PrismLogError, Result};
use crate::sinks::pipeline::Pipeline;
use crate::sinks::traits::SinkMetadata;

use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;

#[derive(Debug)]
struct LoggerInner {
    level: LogLevel,
    pipeline: Pipeline,
    service: String,
    caller: bool,
    stack_error: bool,
}

/// 结构化日志记录器
///
/// `Clone` 只增加引用计数。
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
    scope: Arc<str>,
}

/// 校验键值参数：长度为偶数，且每个键都是字符串
pub fn check_key_values(key_values: &[Value]) -> Result<()> {
    if key_values.len() % 2 != 0 {
        return Err(PrismLogError::InvalidKeyValues(format!(
            "expected alternating keys and values, got {} argument(s)",
            key_values.len()
        )));
    }

    for (index, pair) in key_values.chunks_exact(2).enumerate() {
        if !pair[0].is_string() {
            return Err(PrismLogError::InvalidKeyValues(format!(
                "key at position {} is not a string: {}",
                index * 2,
                pair[0]
            )));
        }
    }

    Ok(())
}

macro_rules! level_methods {
    ($level:expr, $plain:ident, $formatted:ident, $keyed:ident) => {
        #[doc = concat!("以 `", stringify!($plain), "` 级别记录消息")]
        #[track_caller]
        pub fn $plain(&self, message: &str) {
            if self.enabled($level) {
                self.report(self.emit($level, message, &[], None, Location::caller()));
            }
        }

        #[doc = concat!("以 `", stringify!($plain), "` 级别记录格式化消息，级别未启用时不格式化")]
        #[track_caller]
        pub fn $formatted(&self, args: fmt::Arguments<'_>) {
            if self.enabled($level) {
                let location = Location::caller();
                let result = match args.as_str() {
                    Some(message) => self.emit($level, message, &[], None, location),
                    None => self.emit($level, &args.to_string(), &[], None, location),
                };
                self.report(result);
            }
        }

        #[doc = concat!("以 `", stringify!($plain), "` 级别记录消息与键值对")]
        ///
        /// # Panics
        ///
        /// 键值参数个数为奇数或键不是字符串时 panic，不会输出任何内容。
        #[track_caller]
        pub fn $keyed(&self, message: &str, key_values: &[Value]) {
            if let Err(e) = check_key_values(key_values) {
                panic!("{}", e);
            }
            if self.enabled($level) {
                self.report(self.emit($level, message, key_values, None, Location::caller()));
            }
        }
    };
}

impl Logger {
    pub(crate) fn new(
        level: LogLevel,
        pipeline: Pipeline,
        service: String,
        caller: bool,
        stack_error: bool,
    ) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                level,
                pipeline,
                service,
                caller,
                stack_error,
            }),
            scope: Arc::from(""),
        }
    }

    /// 派生带作用域的 logger，原 logger 不变
    pub fn with_scope(&self, scope: impl AsRef<str>) -> Logger {
        Logger {
            inner: Arc::clone(&self.inner),
            scope: Arc::from(scope.as_ref()),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service
    }

    /// 最低输出级别
    pub fn level(&self) -> LogLevel {
        self.inner.level
    }

    /// 给定级别是否会输出
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.inner.level
    }

    /// 写入器的元数据，按扇出顺序
    pub fn sinks(&self) -> Vec<SinkMetadata> {
        self.inner.pipeline.metadata()
    }

    /// 可失败的通用入口
    ///
    /// 返回参数校验错误与 sink 错误，不打印也不 panic。
    /// `Fatal` 与 `Panic` 级别在这里只输出事件，不退出进程也不 panic。
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str, key_values: &[Value]) -> Result<()> {
        check_key_values(key_values)?;
        if !self.enabled(level) {
            return Ok(());
        }
        self.emit(level, message, key_values, None, Location::caller())
    }

    level_methods!(LogLevel::Trace, trace, tracef, tracev);
    level_methods!(LogLevel::Debug, debug, debugf, debugv);
    level_methods!(LogLevel::Info, info, infof, infov);
    level_methods!(LogLevel::Warn, warn, warnf, warnv);
    level_methods!(LogLevel::Error, error, errorf, errorv);

    /// 以 `error` 级别记录一个错误值
    ///
    /// 事件的 `error` 字段为错误描述，`message` 为空；开启 stack_error 时
    /// 附带 `stack`，即 `source()` 链上每一层的描述。
    #[track_caller]
    pub fn err(&self, error: &(dyn Error + 'static)) {
        if self.enabled(LogLevel::Error) {
            self.report(self.emit(LogLevel::Error, "", &[], Some(error), Location::caller()));
        }
    }

    /// 输出后以状态码 1 退出进程
    ///
    /// 不等待异步写入器：InfluxDB 通道中尚未发送的点会随进程一起丢失，
    /// 包括这条 fatal 事件本身。需要送达时使用 [`Logger::fatal_flush`]。
    #[track_caller]
    pub fn fatal(&self, message: &str) -> ! {
        if self.enabled(LogLevel::Fatal) {
            self.report(self.emit(LogLevel::Fatal, message, &[], None, Location::caller()));
        }
        std::process::exit(1)
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        if self.enabled(LogLevel::Fatal) {
            self.report(self.emit(LogLevel::Fatal, &message, &[], None, Location::caller()));
        }
        std::process::exit(1)
    }

    #[track_caller]
    pub fn fatalv(&self, message: &str, key_values: &[Value]) -> ! {
        if let Err(e) = check_key_values(key_values) {
            panic!("{}", e);
        }
        if self.enabled(LogLevel::Fatal) {
            self.report(self.emit(LogLevel::Fatal, message, key_values, None, Location::caller()));
        }
        std::process::exit(1)
    }

    /// 输出 fatal 事件，关闭并刷新所有写入器后以状态码 1 退出进程
    ///
    /// ```rust,no_run
    /// # async fn run(logger: prism_log::Logger) {
    /// logger.fatal_flush("database unreachable").await;
    /// # }
    /// ```
    #[track_caller]
    pub fn fatal_flush<'a>(&'a self, message: &str) -> impl Future<Output = ()> + Send + 'a {
        let flushed = self.fatal_then_shutdown(message);
        async move {
            flushed.await;
            std::process::exit(1);
        }
    }

    /// 事件在调用时同步输出，返回的 future 只负责关闭写入器
    #[track_caller]
    fn fatal_then_shutdown<'a>(&'a self, message: &str) -> impl Future<Output = ()> + Send + 'a {
        if self.enabled(LogLevel::Fatal) {
            self.report(self.emit(LogLevel::Fatal, message, &[], None, Location::caller()));
        }
        async move {
            self.report(self.shutdown().await);
        }
    }

    /// 输出后以消息 panic
    #[track_caller]
    pub fn panic(&self, message: &str) -> ! {
        if self.enabled(LogLevel::Panic) {
            self.report(self.emit(LogLevel::Panic, message, &[], None, Location::caller()));
        }
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        if self.enabled(LogLevel::Panic) {
            self.report(self.emit(LogLevel::Panic, &message, &[], None, Location::caller()));
        }
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicv(&self, message: &str, key_values: &[Value]) -> ! {
        if let Err(e) = check_key_values(key_values) {
            panic!("{}", e);
        }
        if self.enabled(LogLevel::Panic) {
            self.report(self.emit(LogLevel::Panic, message, key_values, None, Location::caller()));
        }
        panic!("{}", message)
    }

    /// 关闭所有写入器，等待异步 sink 刷新
    pub async fn shutdown(&self) -> Result<()> {
        self.inner.pipeline.shutdown().await?;
        Ok(())
    }

    /// 组装事件并扇出；调用前级别与键值参数已检查
    fn emit(
        &self,
        level: LogLevel,
        message: &str,
        key_values: &[Value],
        error: Option<&(dyn Error + 'static)>,
        location: &Location<'_>,
    ) -> Result<()> {
        let mut event = LogEvent::new(level);

        if self.inner.caller {
            event = event.caller(location.file(), location.line());
        }

        for pair in key_values.chunks_exact(2) {
            if let Value::String(key) = &pair[0] {
                event = event.field(key, pair[1].clone());
            }
        }

        if let Some(error) = error {
            event = event.error(error, self.inner.stack_error);
        }

        let bytes = event
            .finish(&self.inner.service, &self.scope, message)
            .to_bytes()?;
        self.inner.pipeline.write(&bytes)?;
        Ok(())
    }

    /// 便捷方法没有返回值，失败只能报告到标准错误
    fn report(&self, result: Result<()>) {
        if let Err(e) = result {
            eprintln!("prism_log: failed to write log event: {}", e);
        }
    }
}
