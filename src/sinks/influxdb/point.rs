//! 事件分类器
//!
//! 把解码后的 JSON 事件转换为 InfluxDB 数据点：
//!
//! - `time` 不写入，由服务端赋予时间戳
//! - `level`、`caller`、`message` 作为 tag，非字符串标量转为字符串，null 跳过
//! - 其他键作为 field 并保留类型；null 跳过，数组与对象存为紧凑 JSON 字符串
//!
//! 行协议格式：
//! ```text
//! log,level=debug,message=m custom=42i
//! ```

use crate::core::event::{CALLER_FIELD, LEVEL_FIELD, MESSAGE_FIELD, TIMESTAMP_FIELD};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// 所有日志点的 measurement 名
pub const MEASUREMENT: &str = "log";

/// 数据点的 field 值
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// UTF-8 字符串
    String(String),
    /// 有符号 64 位整数
    Integer(i64),
    /// 超出 i64 范围的无符号整数
    UInteger(u64),
    /// 64 位浮点数
    Float(f64),
    /// 布尔值
    Boolean(bool),
}

impl FieldValue {
    /// 按 JSON 类型构造；null 返回 `None`
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(FieldValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Some(FieldValue::UInteger(u))
                } else {
                    n.as_f64().map(FieldValue::Float)
                }
            }
            Value::String(s) => Some(FieldValue::String(s.clone())),
            Value::Array(_) | Value::Object(_) => Some(FieldValue::String(value.to_string())),
        }
    }

    /// 行协议中的 field 值写法
    ///
    /// 整数带 `i` 后缀，无符号整数带 `u` 后缀，字符串加双引号并转义。
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
            FieldValue::UInteger(v) => format!("{}u", v),
            FieldValue::String(v) => {
                let escaped = v.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
            FieldValue::Boolean(v) => v.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_protocol())
    }
}

/// 一个 InfluxDB 数据点
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Point {
    /// 对解码后的事件分类
    pub fn from_event(event: &Map<String, Value>) -> Self {
        let mut tags = BTreeMap::new();
        let mut fields = BTreeMap::new();

        for (key, value) in event {
            match key.as_str() {
                TIMESTAMP_FIELD => continue,
                LEVEL_FIELD | CALLER_FIELD | MESSAGE_FIELD => {
                    if let Some(text) = tag_text(value) {
                        tags.insert(key.clone(), text);
                    }
                }
                _ => {
                    if let Some(field) = FieldValue::from_json(value) {
                        fields.insert(key.clone(), field);
                    }
                }
            }
        }

        Self {
            measurement: MEASUREMENT.to_string(),
            tags,
            fields,
        }
    }

    /// 没有 field 的点不能写入 InfluxDB
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// 编码为一行行协议，不带时间戳
    ///
    /// tag 与 field 按键排序；值为空的 tag 被省略。
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.measurement);

        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');

        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }

        line
    }
}

fn tag_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 行协议不允许未加引号的换行，替换为空格
fn flatten_newlines(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// measurement 名需要转义反斜杠、逗号和空格
fn escape_measurement(s: &str) -> String {
    flatten_newlines(&s.replace('\\', "\\\\"))
        .replace(',', "\\,")
        .replace(' ', "\\ ")
}

/// tag 键、tag 值与 field 键还需要转义等号
///
/// 反斜杠必须最先转义，否则末尾的 `\` 会吞掉后面的分隔符。
fn escape_key(s: &str) -> String {
    flatten_newlines(&s.replace('\\', "\\\\"))
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
