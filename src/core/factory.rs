//! Logger 构建器
//!
//! 构建方法按值消费 `self`，最终 [`LoggerFactory::build`] 返回与构建器完全解耦的
//! [`Logger`]。写入器在 [`LoggerFactory::with_writers`] 调用时立即创建，
//! 因此文件写入器所需的服务名、目录以及数据库连接参数应在此之前设置。
//!
//! ```rust,no_run
//! use prism_log::{LogLevel, LoggerFactory, WriterKind};
//!
//! # async fn run() -> prism_log::Result<()> {
//! let logger = LoggerFactory::default()
//!     .with_level(LogLevel::Debug)
//!     .with_service_name("billing")
//!     .with_caller()
//!     .with_writers(&[WriterKind::Console, WriterKind::File])
//!     .await?
//!     .build();
//!
//! logger.debug("ready");
//! logger.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::{
    validate_config, ConsoleConfig, InfluxConfig, InfluxOptions, LoggerConfig,
    DEFAULT_LOG_DIRECTORY,
};
use crate::core::level::{LogLevel, LoggerType, WriterKind};
use crate::core::logger::Logger;
use crate::error::Result;
use crate::sinks::console::ConsoleSink;
use crate::sinks::file::FileSink;
use crate::sinks::influxdb::{FallbackErrorObserver, InfluxDBSink, WriteErrorObserver};
use crate::sinks::pipeline::Pipeline;
use crate::sinks::traits::LogWriter;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Logger 构建器
pub struct LoggerFactory {
    logger_type: LoggerType,
    level: LogLevel,
    service_name: String,
    log_directory: PathBuf,
    console: ConsoleConfig,
    influx: Option<InfluxConfig>,
    influx_options: InfluxOptions,
    caller: bool,
    stack_error: bool,
    observer: Arc<dyn WriteErrorObserver>,
    writers: Vec<Arc<dyn LogWriter>>,
}

impl LoggerFactory {
    pub fn new(logger_type: LoggerType) -> Self {
        Self {
            logger_type,
            level: LogLevel::default(),
            service_name: String::new(),
            log_directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            console: ConsoleConfig::default(),
            influx: None,
            influx_options: InfluxOptions::default(),
            caller: false,
            stack_error: false,
            observer: Arc::new(FallbackErrorObserver),
            writers: Vec::new(),
        }
    }

    /// 由声明式配置创建构建器，不创建写入器
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        validate_config(config)?;

        let mut factory = Self::default()
            .with_level(config.level)
            .with_service_name(config.service_name.clone())
            .with_log_directory(config.log_directory.clone())
            .with_console_config(config.console.clone());

        if let Some(influx) = &config.influxdb {
            factory = factory
                .with_influx_config(influx.connection.clone())
                .with_influx_options(influx.options.clone());
        }
        if config.caller {
            factory = factory.with_caller();
        }
        if config.stack_error {
            factory = factory.with_stack_error();
        }

        Ok(factory)
    }

    /// 由声明式配置直接构建 logger，写入器按 `writers` 顺序创建
    pub async fn build_from_config(config: &LoggerConfig) -> Result<Logger> {
        Ok(Self::from_config(config)?
            .with_writers(&config.writers)
            .await?
            .build())
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// 解析级别名称，大小写不敏感
    pub fn with_level_str(self, level: &str) -> Result<Self> {
        let level = level.parse::<LogLevel>()?;
        Ok(self.with_level(level))
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// 文件写入器所在目录，默认 `logs`
    pub fn with_log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.log_directory = directory.into();
        self
    }

    pub fn with_console_config(mut self, console: ConsoleConfig) -> Self {
        self.console = console;
        self
    }

    /// 数据库写入器的连接参数；未设置时从环境变量读取
    pub fn with_influx_config(mut self, config: InfluxConfig) -> Self {
        self.influx = Some(config);
        self
    }

    pub fn with_influx_options(mut self, options: InfluxOptions) -> Self {
        self.influx_options = options;
        self
    }

    /// 事件附带调用位置 `file:line`
    pub fn with_caller(mut self) -> Self {
        self.caller = true;
        self
    }

    /// `err` 事件附带错误的 `source()` 链
    pub fn with_stack_error(mut self) -> Self {
        self.stack_error = true;
        self
    }

    /// 接收数据库写入器后台错误的观察者
    pub fn with_error_observer(mut self, observer: Arc<dyn WriteErrorObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 追加自定义写入器
    pub fn with_writer(mut self, writer: Arc<dyn LogWriter>) -> Self {
        self.writers.push(writer);
        self
    }

    /// 按顺序创建写入器；允许重复
    ///
    /// 任何一个写入器创建失败都返回错误，已创建的写入器随构建器一起丢弃。
    pub async fn with_writers(mut self, kinds: &[WriterKind]) -> Result<Self> {
        for kind in kinds {
            let writer: Arc<dyn LogWriter> = match kind {
                WriterKind::Console => Arc::new(ConsoleSink::new(self.console.clone())),
                WriterKind::File => Arc::new(FileSink::open(
                    &self.log_directory,
                    &self.service_name,
                )?),
                WriterKind::Database => {
                    let config = match &self.influx {
                        Some(config) => config.clone(),
                        None => InfluxConfig::from_env(),
                    };
                    Arc::new(
                        InfluxDBSink::connect(
                            config,
                            self.influx_options.clone(),
                            Arc::clone(&self.observer),
                        )
                        .await?,
                    )
                }
            };
            debug!("Writer added: {}", kind);
            self.writers.push(writer);
        }
        Ok(self)
    }

    /// 构建 logger；未配置写入器时使用控制台
    pub fn build(self) -> Logger {
        let mut writers = self.writers;
        if writers.is_empty() {
            debug!("No writers configured, falling back to console");
            writers.push(Arc::new(ConsoleSink::new(self.console)));
        }

        info!(
            "Logger built: service='{}', level={}, writers={}",
            self.service_name,
            self.level,
            writers.len()
        );

        match self.logger_type {
            LoggerType::Json => Logger::new(
                self.level,
                Pipeline::new(writers),
                self.service_name,
                self.caller,
                self.stack_error,
            ),
        }
    }
}

impl Default for LoggerFactory {
    fn default() -> Self {
        Self::new(LoggerType::default())
    }
}

impl fmt::Debug for LoggerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerFactory")
            .field("logger_type", &self.logger_type)
            .field("level", &self.level)
            .field("service_name", &self.service_name)
            .field("log_directory", &self.log_directory)
            .field("influx", &self.influx)
            .field("caller", &self.caller)
            .field("stack_error", &self.stack_error)
            .field("writers", &self.writers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use crate::error::PrismLogError;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let logger = LoggerFactory::default().build();
        assert_eq!(logger.level(), LogLevel::Info);
        assert_eq!(logger.scope(), "");
        assert_eq!(logger.service_name(), "");

        let sinks = logger.sinks();
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].name, "console");
    }

    #[test]
    fn test_with_level_str() {
        let factory = LoggerFactory::default().with_level_str("WARN").unwrap();
        assert_eq!(factory.build().level(), LogLevel::Warn);

        assert!(matches!(
            LoggerFactory::default().with_level_str("verbose"),
            Err(PrismLogError::InvalidLogLevel(_))
        ));
    }

    #[tokio::test]
    async fn test_file_writer_requires_service_name() {
        let dir = TempDir::new().unwrap();
        let result = LoggerFactory::default()
            .with_log_directory(dir.path())
            .with_writers(&[WriterKind::File])
            .await;
        assert!(matches!(result, Err(PrismLogError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_writers_created_in_order() {
        let dir = TempDir::new().unwrap();
        let logger = LoggerFactory::default()
            .with_service_name("svc")
            .with_log_directory(dir.path())
            .with_console_config(ConsoleConfig {
                color: Some(false),
                ..ConsoleConfig::default()
            })
            .with_writers(&[WriterKind::File, WriterKind::Console, WriterKind::File])
            .await
            .unwrap()
            .build();

        let names: Vec<String> = logger.sinks().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["file", "console", "file"]);
        assert!(dir.path().join("svc.log").exists());
    }

    #[tokio::test]
    async fn test_build_from_config() {
        let dir = TempDir::new().unwrap();
        let toml = format!(
            "level = \"debug\"\nservice_name = \"svc\"\nwriters = [\"file\"]\n\
             log_directory = {:?}\ncaller = true\n",
            dir.path().to_string_lossy()
        );
        let config = load_config_from_str(&toml).unwrap();
        let logger = LoggerFactory::build_from_config(&config).await.unwrap();

        assert_eq!(logger.level(), LogLevel::Debug);
        logger.debug("from config");
        logger.shutdown().await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join("svc.log")).unwrap();
        assert!(contents.contains("\"message\":\"from config\""));
        assert!(contents.contains("\"caller\":"));
    }

    #[test]
    fn test_from_config_validates() {
        let config = LoggerConfig {
            writers: vec![WriterKind::File],
            ..LoggerConfig::default()
        };
        assert!(matches!(
            LoggerFactory::from_config(&config),
            Err(PrismLogError::ConfigError(_))
        ));
    }
}
