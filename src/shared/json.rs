use serde_json::Value;

/// Backend payloads are loosely typed; ids and dates arrive as strings or
/// numbers depending on the endpoint. Everything is normalized to trimmed
/// text before it reaches the domain layer.
pub fn json_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => return None,
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

pub fn json_text_or_empty(value: Option<&Value>) -> String {
    json_text(value).unwrap_or_default()
}
