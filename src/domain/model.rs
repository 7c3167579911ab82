use crate::utils::error::{Result, TargetError};
use serde_json::{Map, Value};

/// 攤平後的單筆記錄，欄位順序即插入順序
pub type FlatRecord = Map<String, Value>;

/// 一行輸入解析後的訊息
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Schema {
        stream: String,
        schema: Value,
        key_properties: Vec<String>,
    },
    Record {
        stream: String,
        record: Map<String, Value>,
    },
    State {
        value: Option<Value>,
    },
}

impl Message {
    /// 依 `type` 欄位分派，所有必要欄位都在這裡檢查
    pub fn from_value(value: Value, line: &str) -> Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(TargetError::protocol(format!(
                    "Line is not a JSON object ({}): {}",
                    json_kind(&other),
                    line
                )))
            }
        };

        let message_type = object
            .remove("type")
            .ok_or_else(|| missing_key("type", line))?;

        match message_type.as_str() {
            Some("RECORD") => {
                let stream = take_stream(&mut object, line)?;
                let record = match object.remove("record") {
                    Some(Value::Object(record)) => record,
                    Some(other) => {
                        return Err(TargetError::protocol(format!(
                            "Field 'record' must be an object, got {}: {}",
                            json_kind(&other),
                            line
                        )))
                    }
                    None => return Err(missing_key("record", line)),
                };
                Ok(Message::Record { stream, record })
            }
            Some("SCHEMA") => {
                let stream = take_stream(&mut object, line)?;
                let schema = object
                    .remove("schema")
                    .ok_or_else(|| missing_key("schema", line))?;
                let key_properties = object
                    .remove("key_properties")
                    .ok_or_else(|| missing_key("key_properties", line))?;
                let key_properties = parse_key_properties(key_properties, line)?;
                Ok(Message::Schema {
                    stream,
                    schema,
                    key_properties,
                })
            }
            Some("STATE") => {
                let value = object.remove("value").filter(|v| !v.is_null());
                Ok(Message::State { value })
            }
            _ => Err(TargetError::protocol(format!(
                "Unknown message type {} in message {}",
                message_type, line
            ))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::Schema { .. } => "SCHEMA",
            Message::Record { .. } => "RECORD",
            Message::State { .. } => "STATE",
        }
    }
}

/// 已註冊的 stream schema
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSchema {
    pub schema: Value,
    pub key_properties: Vec<String>,
}

fn take_stream(object: &mut Map<String, Value>, line: &str) -> Result<String> {
    match object.remove("stream") {
        Some(Value::String(stream)) => Ok(stream),
        Some(other) => Err(TargetError::protocol(format!(
            "Field 'stream' must be a string, got {}: {}",
            json_kind(&other),
            line
        ))),
        None => Err(missing_key("stream", line)),
    }
}

fn parse_key_properties(value: Value, line: &str) -> Result<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(TargetError::protocol(format!(
                "Field 'key_properties' must be an array, got {}: {}",
                json_kind(&other),
                line
            )))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(key) => Ok(key),
            other => Err(TargetError::protocol(format!(
                "Entries of 'key_properties' must be strings, got {}: {}",
                json_kind(&other),
                line
            ))),
        })
        .collect()
}

fn missing_key(key: &str, line: &str) -> TargetError {
    TargetError::protocol(format!("Line is missing required key '{}': {}", key, line))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
