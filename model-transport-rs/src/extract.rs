//! Pull a structured reply out of model text
//!
//! Local reasoning models wrap their answer in `<think>` blocks, markdown
//! fences or chatty prose. We strip the reasoning, then look for a JSON
//! object. Text with no parseable object comes back as a JSON string so the
//! caller can classify it as malformed output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("valid think pattern"));
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid fence pattern"));

/// Remove `<think>...</think>` sections, including an unterminated trailing one
pub fn strip_reasoning(text: &str) -> String {
    let mut cleaned = THINK_BLOCK.replace_all(text, "").into_owned();

    if let Some(open) = cleaned.find("<think>") {
        cleaned.truncate(open);
    }

    cleaned.trim().to_string()
}

/// Best-effort conversion of model text into a JSON value
pub fn extract_structured(text: &str) -> Value {
    let cleaned = strip_reasoning(text);

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&cleaned) {
        return value;
    }

    for caps in CODE_FENCE.captures_iter(&cleaned) {
        if let Some(body) = caps.get(1) {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(body.as_str().trim()) {
                return value;
            }
        }
    }

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&cleaned[start..=end]) {
                return value;
            }
        }
    }

    Value::String(cleaned)
}
