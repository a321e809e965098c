//! Recovery of structured data from AI text output
//!
//! Models frequently wrap JSON in a markdown code fence, sometimes labelled
//! `json`. This module strips those two known decorations and then parses
//! strictly. It deliberately does NOT attempt fuzzy repair of broken JSON:
//! anything beyond fence and label stripping is a hard failure. That is a
//! documented limitation, not a bug.

use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to recover a JSON object from AI output
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("response was not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("response was valid JSON but not an object")]
    NotAnObject,
}

/// Recover a flat JSON object from raw AI output
///
/// Pipeline:
/// 1. Trim the raw text.
/// 2. If it begins with a triple-backtick fence, strip all leading and
///    trailing backticks, then trim again.
/// 3. If the remainder starts (case-insensitively) with the word `json`,
///    remove it and trim again.
/// 4. Parse the remainder as a JSON object, or fail.
pub fn recover_json(raw: &str) -> Result<Map<String, Value>, RecoveryError> {
    let mut cleaned = raw.trim();

    if cleaned.starts_with("```") {
        cleaned = cleaned.trim_matches('`').trim_start();
    }

    if let Some(prefix) = cleaned.get(..4) {
        if prefix.eq_ignore_ascii_case("json") {
            cleaned = &cleaned[4..];
        }
    }
    let cleaned = cleaned.trim();

    match serde_json::from_str::<Value>(cleaned)? {
        Value::Object(map) => Ok(map),
        _ => Err(RecoveryError::NotAnObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_fenced_json() {
        let raw = "```json\n{\"a\": 1}\n```";
        let map = recover_json(raw).expect("should recover");
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_recovers_plain_json_unchanged() {
        let map = recover_json("{\"a\": 1}").expect("should recover");
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_fence_handling_is_idempotent_with_respect_to_fence_presence() {
        let fenced = recover_json("```json\n{\"a\": 1}\n```").expect("fenced");
        let plain = recover_json("{\"a\": 1}").expect("plain");
        assert_eq!(fenced, plain);
    }

    #[test]
    fn test_recovers_fence_without_json_label() {
        let raw = "```\n{\"tone\": \"reassuring\"}\n```";
        let map = recover_json(raw).expect("should recover");
        assert_eq!(map.get("tone"), Some(&Value::from("reassuring")));
    }

    #[test]
    fn test_json_label_is_case_insensitive() {
        let raw = "```JSON\n{\"a\": 1}\n```";
        let map = recover_json(raw).expect("should recover");
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let raw = "   \n {\"a\": 1} \n  ";
        assert!(recover_json(raw).is_ok());
    }

    #[test]
    fn test_commentary_wrapped_json_is_a_hard_failure() {
        let raw = "Sure! Here's your answer: {a:1}";
        assert!(matches!(recover_json(raw), Err(RecoveryError::NotJson(_))));
    }

    #[test]
    fn test_single_quoted_pseudo_json_fails() {
        // The prompt asks for JSON but models occasionally emit Python-style
        // dicts. No repair is attempted.
        let raw = "{'top_category': 'Food'}";
        assert!(recover_json(raw).is_err());
    }

    #[test]
    fn test_non_object_json_fails() {
        assert!(matches!(
            recover_json("[1, 2, 3]"),
            Err(RecoveryError::NotAnObject)
        ));
        assert!(matches!(
            recover_json("\"just a string\""),
            Err(RecoveryError::NotAnObject)
        ));
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(recover_json("").is_err());
        assert!(recover_json("``````").is_err());
    }

    #[test]
    fn test_preserves_nested_values_inside_object() {
        let raw = "```json\n{\"options\": [\"a\", \"b\"], \"count\": 2}\n```";
        let map = recover_json(raw).expect("should recover");
        assert_eq!(
            map.get("options"),
            Some(&Value::from(vec!["a", "b"]))
        );
    }
}
