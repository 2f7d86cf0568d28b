//! Human-readable rendering of responses, in the style of redis-cli.

use crate::protocol::Value;

/// Formats a response for terminal display
pub fn format_value(value: &Value) -> String {
    format_nested(value, 0)
}

fn format_nested(value: &Value, indent: usize) -> String {
    match value {
        Value::SimpleString(s) => s.clone(),
        Value::Error(e) => format!("(error) {}", e),
        Value::Integer(n) => format!("(integer) {}", n),
        Value::BulkString(None) | Value::Array(None) => "(nil)".to_string(),
        Value::BulkString(Some(data)) => format!("\"{}\"", String::from_utf8_lossy(data).escape_debug()),
        Value::Array(Some(elements)) if elements.is_empty() => "(empty array)".to_string(),
        Value::Array(Some(elements)) => {
            let width = elements.len().to_string().len();
            let pad = " ".repeat(indent);
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| {
                    let label = format!("{:>width$}) ", i + 1, width = width);
                    let body = format_nested(element, indent + label.len());
                    if i == 0 {
                        format!("{}{}", label, body)
                    } else {
                        format!("{}{}{}", pad, label, body)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
