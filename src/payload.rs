//! Custom payload extraction from a ```json fenced block.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

fn re_json_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json(.*?)```").unwrap())
}

/// Parse the first ```json block in `text` into a JSON object.
///
/// Missing or empty blocks yield an empty object silently. Malformed JSON and
/// non-object values are logged as warnings and also yield an empty object;
/// neither blocks dispatch of the item.
pub fn extract_custom_payload(text: Option<&str>) -> Map<String, Value> {
    let Some(text) = text else {
        return Map::new();
    };
    let Some(caps) = re_json_block().captures(text) else {
        return Map::new();
    };
    let content = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
    if content.is_empty() {
        return Map::new();
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            log::warn!(
                "JSON payload is not an object ({}), using empty object",
                json_kind(&other)
            );
            Map::new()
        }
        Err(e) => {
            log::warn!("Failed to parse JSON payload: {}", e);
            Map::new()
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log;
    use serde_json::json;

    #[test]
    fn test_no_text_or_block() {
        assert!(extract_custom_payload(None).is_empty());
        assert!(extract_custom_payload(Some("")).is_empty());
        assert!(extract_custom_payload(Some("just a description")).is_empty());
    }

    #[test]
    fn test_empty_block() {
        assert!(extract_custom_payload(Some("```json\n   \n```")).is_empty());
    }

    #[test]
    fn test_object_block() {
        let text = "Deploy notes\n```json\n{\"env\": \"prod\", \"replicas\": 3}\n```\nthanks";
        let payload = extract_custom_payload(Some(text));
        assert_eq!(Value::Object(payload), json!({"env": "prod", "replicas": 3}));
    }

    #[test]
    fn test_nested_values_preserved() {
        let text = "```json\n{\"a\": {\"b\": [1, 2, {\"c\": null}]}, \"ok\": true}\n```";
        let payload = extract_custom_payload(Some(text));
        assert_eq!(
            Value::Object(payload),
            json!({"a": {"b": [1, 2, {"c": null}]}, "ok": true})
        );
    }

    #[test]
    fn test_first_block_only() {
        let text = "```json\n{\"first\": 1}\n```\n\n```json\n{\"second\": 2}\n```";
        let payload = extract_custom_payload(Some(text));
        assert_eq!(Value::Object(payload), json!({"first": 1}));
    }

    #[test]
    fn test_inline_fence_without_newlines() {
        let payload = extract_custom_payload(Some("```json{\"k\":\"v\"}```"));
        assert_eq!(payload.get("k"), Some(&json!("v")));
    }

    #[test]
    fn test_malformed_json() {
        test_log::start();
        assert!(extract_custom_payload(Some("```json\n{not json}\n```")).is_empty());

        let warnings = test_log::take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse JSON payload"));
    }

    #[test]
    fn test_non_object_values() {
        test_log::start();
        for (block, kind) in [
            ("```json\n[1, 2, 3]\n```", "array"),
            ("```json\n\"text\"\n```", "string"),
            ("```json\n42\n```", "number"),
            ("```json\nnull\n```", "null"),
        ] {
            assert!(extract_custom_payload(Some(block)).is_empty());
            let warnings = test_log::take_warnings();
            assert_eq!(warnings.len(), 1, "{block:?}");
            assert!(warnings[0].contains(&format!("not an object ({})", kind)), "{}", warnings[0]);
        }
    }

    #[test]
    fn test_missing_block_is_silent() {
        test_log::start();
        assert!(extract_custom_payload(Some("no payload here")).is_empty());
        assert!(extract_custom_payload(Some("```json\n   \n```")).is_empty());
        assert!(test_log::take_warnings().is_empty());
    }

    #[test]
    fn test_unclosed_fence() {
        assert!(extract_custom_payload(Some("```json\n{\"a\": 1}")).is_empty());
    }
}
