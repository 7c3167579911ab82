use crate::domain::model::FlatRecord;
use serde_json::{Map, Value};

/// 巢狀欄位名稱的連接符號
pub const KEY_SEPARATOR: &str = "__";

/// 將巢狀 JSON 物件攤平成單層欄位
///
/// - 物件：遞迴展開，鍵名以 `__` 連接
/// - 陣列：轉成字串，例如 `[1, 2]`
/// - 其他純量：原樣保留
///
/// 值為 `{}` 的欄位不會出現在結果中。
pub fn flatten(record: &Map<String, Value>) -> FlatRecord {
    let mut flat = FlatRecord::new();
    flatten_into(record, None, &mut flat);
    flat
}

fn flatten_into(object: &Map<String, Value>, parent_key: Option<&str>, out: &mut FlatRecord) {
    for (key, value) in object {
        let new_key = match parent_key {
            Some(parent) => format!("{}{}{}", parent, KEY_SEPARATOR, key),
            None => key.clone(),
        };

        match value {
            Value::Object(child) => flatten_into(child, Some(&new_key), out),
            Value::Array(items) => {
                out.insert(new_key, Value::String(stringify_array(items)));
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                out.insert(new_key, value.clone());
            }
        }
    }
}

/// 陣列的字串表示，例如 `[1, 'a', True, None]`
pub fn stringify_array(items: &[Value]) -> String {
    let mut out = String::new();
    write_list(items, &mut out);
    out
}

/// 與舊版 Python target 相容的文字表示 (`True`/`False`/`None`、單引號字串)
pub fn python_repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(value, &mut out);
    out
}

fn write_list(items: &[Value], out: &mut String) {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(item, out);
    }
    out.push(']');
}

fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_str_repr(s, out),
        Value::Array(items) => write_list(items, out),
        Value::Object(object) => {
            out.push('{');
            for (i, (key, child)) in object.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str_repr(key, out);
                out.push_str(": ");
                write_repr(child, out);
            }
            out.push('}');
        }
    }
}

// 含單引號且不含雙引號時改用雙引號，其餘用單引號
fn write_str_repr(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || ('\u{7f}'..='\u{9f}').contains(&c) => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
