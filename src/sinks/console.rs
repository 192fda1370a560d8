//! 控制台输出 Sink 实现
//!
//! 将 JSON 事件解码后渲染为一行便于阅读的文本：
//!
//! ```text
//! 2024-05-01T10:00:00+00:00 DBG main.rs:12 > message=hello scope="" service=test
//! ```
//!
//! 与文件 sink 的区别：文件得到的是原始 JSON 字节，控制台得到的是同一组
//! 键值的文本渲染。时间按 [`ConsoleConfig::time_format`] 重新格式化，
//! 其余键按字母顺序输出。

use crate::config::ConsoleConfig;
use crate::core::event::{decode_event, CALLER_FIELD, LEVEL_FIELD, MESSAGE_FIELD, TIMESTAMP_FIELD};
use crate::core::level::LogLevel;
use crate::sinks::traits::{LogWriter, SinkError, SinkMetadata, SinkResult};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use serde_json::{Map, Value};
use std::fmt::{self, Write as _};
use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

/// 控制台输出 Sink
///
/// 输出通过互斥锁串行化，并发调用不会交错同一行。
pub struct ConsoleSink {
    config: ConsoleConfig,
    color: bool,
    output: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// 创建写入标准输出的控制台 Sink
    pub fn new(config: ConsoleConfig) -> Self {
        let color = config.color.unwrap_or_else(|| io::stdout().is_terminal());
        Self {
            config,
            color,
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// 创建写入任意目标的控制台 Sink
    ///
    /// 未显式开启颜色时不着色。
    pub fn with_output<W>(config: ConsoleConfig, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let color = config.color.unwrap_or(false);
        Self {
            config,
            color,
            output: Mutex::new(Box::new(output)),
        }
    }

    /// 是否着色输出
    pub fn is_colored(&self) -> bool {
        self.color
    }

    /// 将解码后的事件渲染为一行文本（含换行）
    pub fn render(&self, fields: &Map<String, Value>) -> String {
        let mut line = String::with_capacity(128);

        if let Some(time) = fields.get(TIMESTAMP_FIELD) {
            line.push_str(&self.format_time(time));
            line.push(' ');
        }

        let level = fields
            .get(LEVEL_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<LogLevel>().ok());
        match level {
            Some(level) => line.push_str(&self.paint_level(level)),
            None => line.push_str("???"),
        }

        if let Some(caller) = fields.get(CALLER_FIELD) {
            let caller = scalar_text(caller);
            if self.color {
                let _ = write!(line, " {} {}", caller.as_str().bold(), ">".cyan());
            } else {
                let _ = write!(line, " {} >", caller);
            }
        }

        if let Some(message) = fields.get(MESSAGE_FIELD) {
            line.push(' ');
            self.push_pair(&mut line, MESSAGE_FIELD, message);
        }

        let mut rest: Vec<(&String, &Value)> = fields
            .iter()
            .filter(|(key, _)| {
                !matches!(
                    key.as_str(),
                    TIMESTAMP_FIELD | LEVEL_FIELD | CALLER_FIELD | MESSAGE_FIELD
                )
            })
            .collect();
        rest.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in rest {
            line.push(' ');
            self.push_pair(&mut line, key, value);
        }

        line.push('\n');
        line
    }

    fn format_time(&self, time: &Value) -> String {
        match time.as_str().map(DateTime::parse_from_rfc3339) {
            Some(Ok(parsed)) => parsed
                .with_timezone(&Local)
                .format(&self.config.time_format)
                .to_string(),
            _ => scalar_text(time),
        }
    }

    fn paint_level(&self, level: LogLevel) -> String {
        let abbr = level.abbreviation();
        if !self.color {
            return abbr.to_string();
        }
        let painted: ColoredString = match level {
            LogLevel::Trace => abbr.magenta(),
            LogLevel::Debug => abbr.yellow(),
            LogLevel::Info => abbr.green(),
            LogLevel::Warn => abbr.red(),
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => abbr.red().bold(),
        };
        painted.to_string()
    }

    fn push_pair(&self, line: &mut String, key: &str, value: &Value) {
        let value = quote_if_needed(value);
        if self.color {
            let _ = write!(line, "{}{}", format!("{}=", key).as_str().cyan(), value);
        } else {
            let _ = write!(line, "{}={}", key, value);
        }
    }
}

/// 字符串直接输出；其他类型使用紧凑 JSON
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 空字符串以及包含空白、引号或 `=` 的字符串加引号
fn quote_if_needed(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let needs_quotes = s.is_empty()
                || s
                    .chars()
                    .any(|c| c.is_whitespace() || c == '"' || c == '=');
            if needs_quotes {
                value.to_string()
            } else {
                s.clone()
            }
        }
        other => other.to_string(),
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("config", &self.config)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LogWriter for ConsoleSink {
    fn write(&self, event: &[u8]) -> SinkResult<usize> {
        let fields = decode_event(event).map_err(|e| SinkError::Serialization(e.to_string()))?;
        let line = self.render(&fields);

        let mut output = self
            .output
            .lock()
            .map_err(|_| SinkError::Generic("console output lock poisoned".to_string()))?;
        output.write_all(line.as_bytes())?;
        output.flush()?;

        Ok(event.len())
    }

    async fn shutdown(&self) -> SinkResult<()> {
        if let Ok(mut output) = self.output.lock() {
            output.flush()?;
        }
        tracing::debug!("ConsoleSink shutdown completed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }

    fn metadata(&self) -> SinkMetadata {
        SinkMetadata::new("console".to_string())
            .with_description("Human-readable console output".to_string())
    }
}
