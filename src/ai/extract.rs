//! Reply extraction from the proxy's `data` field.
//!
//! Upstream providers disagree on response shape, so the reply text is taken
//! from the first extractor in [`EXTRACTORS`] that yields a non-empty string.

use serde_json::Value;
use tracing::{trace, warn};

pub type Extractor = fn(&Value) -> Option<String>;

/// Tried in order; see [`extract_reply`].
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("choices[0].message.content", choice_message_content),
    ("choices[0].text", choice_text),
    ("content", top_level_content),
    ("raw", top_level_raw),
];

fn non_empty(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_choice(data: &Value) -> Option<&Value> {
    data.get("choices")?.get(0)
}

pub fn choice_message_content(data: &Value) -> Option<String> {
    non_empty(first_choice(data)?.get("message")?.get("content")?)
}

pub fn choice_text(data: &Value) -> Option<String> {
    non_empty(first_choice(data)?.get("text")?)
}

pub fn top_level_content(data: &Value) -> Option<String> {
    non_empty_str(data.get("content")?)
}

pub fn top_level_raw(data: &Value) -> Option<String> {
    non_empty_str(data.get("raw")?)
}

/// Reply text from `data`, falling back to the serialized value itself.
pub fn extract_reply(data: &Value) -> String {
    for (shape, extractor) in EXTRACTORS {
        if let Some(text) = extractor(data) {
            trace!(shape, "extracted reply");
            return text;
        }
    }
    // Unknown shape: show the body rather than nothing, but make it visible in logs.
    warn!("no known reply shape matched; rendering raw response body");
    data.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn openai_message_shape() {
        let data = json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(extract_reply(&data), "hello");
    }

    #[test]
    fn completion_text_shape() {
        let data = json!({"choices": [{"text": "legacy"}]});
        assert_eq!(extract_reply(&data), "legacy");
    }

    #[test]
    fn empty_message_content_falls_through() {
        let data = json!({"choices": [{"message": {"content": ""}, "text": "from text"}]});
        assert_eq!(extract_reply(&data), "from text");
    }

    #[test]
    fn top_level_content_then_raw() {
        assert_eq!(extract_reply(&json!({"content": "plain"})), "plain");
        assert_eq!(extract_reply(&json!({"raw": "<html>502</html>"})), "<html>502</html>");
        assert_eq!(
            extract_reply(&json!({"content": "", "raw": "fallback"})),
            "fallback"
        );
    }

    #[test]
    fn unknown_shape_serializes_body() {
        let data = json!({"result": {"answer": 42}});
        assert_eq!(extract_reply(&data), r#"{"result":{"answer":42}}"#);
        assert_eq!(extract_reply(&Value::Null), "null");
    }

    #[test]
    fn extractors_are_individually_addressable() {
        let data = json!({"choices": [{"message": {"content": "a"}, "text": "b"}], "content": "c"});
        let results: Vec<_> = EXTRACTORS.iter().map(|(_, f)| f(&data)).collect();
        assert_eq!(
            results,
            vec![Some("a".into()), Some("b".into()), Some("c".into()), None]
        );
    }
}
