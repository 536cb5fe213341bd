//! Python literal encoding.
//!
//! Values are serialized through `serde_json::Value` and printed as Python
//! source: `None`/`True`/`False`, double-quoted strings, lists and dicts.
//! Object keys keep their serialization order, so output is deterministic.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

const INDENT: &str = "    ";

/// Encode a value as a single-line Python literal.
pub fn to_python<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&mut out, &value, None);
    Ok(out)
}

/// Encode a value as a Python literal with one element per line.
pub fn to_python_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&mut out, &value, Some(0));
    Ok(out)
}

/// Encode a string as a double-quoted Python literal.
pub fn python_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_str(&mut out, s);
    out
}

/// Encode a boolean as `True` or `False`.
pub fn python_bool(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

fn write_value(out: &mut String, value: &Value, depth: Option<usize>) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(b) => out.push_str(python_bool(*b)),
        Value::Number(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::String(s) => write_str(out, s),
        Value::Array(items) => write_seq(out, '[', ']', items.iter(), depth, write_value),
        Value::Object(map) => {
            write_seq(out, '{', '}', map.iter(), depth, |out, (key, item), depth| {
                write_str(out, key);
                out.push_str(": ");
                write_value(out, item, depth);
            })
        }
    }
}

fn write_seq<I, F>(
    out: &mut String,
    open: char,
    close: char,
    items: I,
    depth: Option<usize>,
    mut write_item: F,
) where
    I: ExactSizeIterator,
    F: FnMut(&mut String, I::Item, Option<usize>),
{
    out.push(open);
    if items.len() == 0 {
        out.push(close);
        return;
    }

    match depth {
        None => {
            for (i, item) in items.enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_item(out, item, None);
            }
        }
        Some(depth) => {
            for item in items {
                out.push('\n');
                push_indent(out, depth + 1);
                write_item(out, item, Some(depth + 1));
                out.push(',');
            }
            out.push('\n');
            push_indent(out, depth);
        }
    }
    out.push(close);
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_str(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(to_python(&json!(null)).expect("enc"), "None");
        assert_eq!(to_python(&true).expect("enc"), "True");
        assert_eq!(to_python(&42).expect("enc"), "42");
        assert_eq!(to_python(&1.5).expect("enc"), "1.5");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            python_str("C:\\Program Files\\\"x\"\n\t\u{1}"),
            r#""C:\\Program Files\\\"x\"\n\t\x01""#
        );
        assert_eq!(python_str("Copyright © 2026"), "\"Copyright © 2026\"");
    }

    #[test]
    fn test_containers_keep_key_order() {
        let value = json!({"zeta": [1, 2], "alpha": {"on": false}});
        assert_eq!(
            to_python(&value).expect("enc"),
            r#"{"zeta": [1, 2], "alpha": {"on": False}}"#
        );
    }

    #[test]
    fn test_pretty_layout() {
        let value = json!([{"a": 1}, []]);
        assert_eq!(
            to_python_pretty(&value).expect("enc"),
            "[\n    {\n        \"a\": 1,\n    },\n    [],\n]"
        );
    }
}
