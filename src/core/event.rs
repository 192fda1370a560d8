//! PrismLog 事件定义
//!
//! 每次日志调用都会构造一个新的 [`LogEvent`]，它是一个保持插入顺序的
//! JSON 对象，最终被编码为一行紧凑 JSON 交给各个 sink。

use crate::core::level::LogLevel;
use crate::error::{PrismLogError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// 时间戳字段名
pub const TIMESTAMP_FIELD: &str = "time";
/// 级别字段名
pub const LEVEL_FIELD: &str = "level";
/// 消息字段名
pub const MESSAGE_FIELD: &str = "message";
/// 调用位置字段名
pub const CALLER_FIELD: &str = "caller";
/// 错误描述字段名
pub const ERROR_FIELD: &str = "error";
/// 错误链字段名
pub const STACK_FIELD: &str = "stack";
/// 服务名字段名
pub const SERVICE_FIELD: &str = "service";
/// 作用域字段名
pub const SCOPE_FIELD: &str = "scope";

/// 由 logger 自己写入的字段，调用方提供的同名键会被覆盖
pub const RESERVED_FIELDS: [&str; 8] = [
    TIMESTAMP_FIELD,
    LEVEL_FIELD,
    MESSAGE_FIELD,
    CALLER_FIELD,
    ERROR_FIELD,
    STACK_FIELD,
    SERVICE_FIELD,
    SCOPE_FIELD,
];

/// 判断字段名是否为保留字段
pub fn is_reserved(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

/// 单条结构化日志事件
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    fields: Map<String, Value>,
}

impl LogEvent {
    /// 以当前时间创建事件
    pub fn new(level: LogLevel) -> Self {
        Self::with_timestamp(level, Utc::now())
    }

    /// 以指定时间创建事件
    pub fn with_timestamp(level: LogLevel, timestamp: DateTime<Utc>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        fields.insert(LEVEL_FIELD.to_string(), Value::String(level.to_string()));
        Self { fields }
    }

    /// 添加调用方字段；保留字段名被忽略，由 logger 写入的值为准
    pub fn field(mut self, key: &str, value: Value) -> Self {
        if !is_reserved(key) {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    /// 添加调用位置
    pub fn caller(mut self, file: &str, line: u32) -> Self {
        self.fields.insert(
            CALLER_FIELD.to_string(),
            Value::String(format!("{}:{}", file, line)),
        );
        self
    }

    /// 记录错误描述，可选附带 `source()` 链
    pub fn error(mut self, error: &(dyn std::error::Error + 'static), with_stack: bool) -> Self {
        self.fields
            .insert(ERROR_FIELD.to_string(), Value::String(error.to_string()));

        if with_stack {
            let mut chain = Vec::new();
            let mut source = error.source();
            while let Some(cause) = source {
                chain.push(Value::String(cause.to_string()));
                source = cause.source();
            }
            self.fields
                .insert(STACK_FIELD.to_string(), Value::Array(chain));
        }
        self
    }

    /// 追加服务名、作用域与消息，总是最后写入
    pub fn finish(mut self, service: &str, scope: &str, message: &str) -> Self {
        self.fields
            .insert(SERVICE_FIELD.to_string(), Value::String(service.to_string()));
        self.fields
            .insert(SCOPE_FIELD.to_string(), Value::String(scope.to_string()));
        self.fields
            .insert(MESSAGE_FIELD.to_string(), Value::String(message.to_string()));
        self
    }

    /// 获取字段
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// 获取全部字段
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// 编码为以换行结尾的 JSON 行
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(&self.fields)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// 将 JSON 事件字节解码为键值映射
pub fn decode_event(bytes: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => Ok(map),
        other => Err(PrismLogError::from(<serde_json::Error as serde::de::Error>::custom(
            format!("event must be a JSON object, got {}", json_type_name(&other)),
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_event_field_order() {
        let event = LogEvent::with_timestamp(LogLevel::Debug, fixed_time())
            .field("custom", json!(42))
            .finish("test", "main", "hello");

        let bytes = event.to_bytes().unwrap();
        let line = String::from_utf8(bytes).unwrap();
        assert_eq!(
            line,
            "{\"time\":\"2024-05-01T10:00:00Z\",\"level\":\"debug\",\"custom\":42,\
             \"service\":\"test\",\"scope\":\"main\",\"message\":\"hello\"}\n"
        );
    }

    #[test]
    fn test_reserved_fields_win() {
        let event = LogEvent::with_timestamp(LogLevel::Info, fixed_time())
            .field("service", json!("spoofed"))
            .field("level", json!("panic"))
            .field("scope", json!("other"))
            .finish("billing", "", "m");

        assert_eq!(event.get("service"), Some(&json!("billing")));
        assert_eq!(event.get("scope"), Some(&json!("")));
        assert_eq!(event.get("level"), Some(&json!("info")));
    }

    #[test]
    fn test_error_with_stack() {
        #[derive(Debug)]
        struct Outer(std::io::Error);
        impl std::fmt::Display for Outer {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "request failed")
            }
        }
        impl std::error::Error for Outer {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let err = Outer(std::io::Error::new(std::io::ErrorKind::Other, "socket closed"));
        let event = LogEvent::new(LogLevel::Error).error(&err, true);
        assert_eq!(event.get("error"), Some(&json!("request failed")));
        assert_eq!(event.get("stack"), Some(&json!(["socket closed"])));

        let event = LogEvent::new(LogLevel::Error).error(&err, false);
        assert!(event.get("stack").is_none());
    }

    #[test]
    fn test_decode_event() {
        let map = decode_event(b"{\"level\":\"info\",\"n\":1}\n").unwrap();
        assert_eq!(map.get("n"), Some(&json!(1)));

        assert!(decode_event(b"not json").is_err());
        assert!(matches!(
            decode_event(b"[1,2]"),
            Err(PrismLogError::SerializationError { .. })
        ));
    }
}
