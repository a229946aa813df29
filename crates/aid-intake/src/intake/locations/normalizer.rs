use serde_json::Value;

/// Code used when the dataset omits one: trimmed name, uppercased, whitespace
/// runs collapsed to `_`.
pub(crate) fn synthesize_code(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Render an explicit code value, or `None` when the value is unusable.
pub(crate) fn explicit_code(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Integer id from a number or a numeric string.
pub(crate) fn explicit_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(raw) => raw.trim().parse::<u64>().ok(),
        _ => None,
    }
}
