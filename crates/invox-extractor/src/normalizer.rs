//! Turn raw model output into a field mapping
//!
//! Models sometimes wrap their JSON in prose or code fences. The fallback
//! here recovers the common case - one object somewhere inside the text -
//! without a full parser. It cannot recover multiple independent objects
//! or nested unbalanced braces; that is a known limitation, not a bug to
//! paper over.

use serde_json::{Map, Value};

/// Outcome of normalization. Never an error: callers must treat [`Raw`]
/// as a normalization failure, since downstream code indexes by field name.
///
/// [`Raw`]: Normalized::Raw
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The text was (or contained) a JSON object.
    Mapping(Map<String, Value>),
    /// Neither parse attempt produced an object; original text returned
    /// unchanged.
    Raw(String),
}

/// Normalize raw model text into a field mapping.
///
/// Strict order: parse the whole text as a JSON object; failing that,
/// parse the greedy span from the first `{` to the last `}`; failing
/// that, hand the text back unchanged.
pub fn normalize(raw: &str) -> Normalized {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Normalized::Mapping(map);
    }

    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&raw[start..=end]) {
                return Normalized::Mapping(map);
            }
        }
    }

    Normalized::Raw(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(n: Normalized) -> Map<String, Value> {
        match n {
            Normalized::Mapping(map) => map,
            Normalized::Raw(raw) => panic!("expected mapping, got raw: {raw:?}"),
        }
    }

    #[test]
    fn test_plain_json_object() {
        let map = mapping(normalize(
            r#"{"client_name": "Acme", "invoice_amount": 12.5, "product_name": "Widget"}"#,
        ));
        assert_eq!(map["client_name"], json!("Acme"));
        assert_eq!(map["invoice_amount"], json!(12.5));
    }

    #[test]
    fn test_prose_wrapped_object() {
        let raw = "Here is the result: {\"client_name\": \"Acme\", \"invoice_amount\": 12.5, \"product_name\": \"Widget\"} Thanks!";
        let map = mapping(normalize(raw));
        assert_eq!(map["client_name"], json!("Acme"));
        assert_eq!(map["invoice_amount"], json!(12.5));
        assert_eq!(map["product_name"], json!("Widget"));
    }

    #[test]
    fn test_code_fenced_object() {
        let raw = "```json\n{\"client_name\": null}\n```";
        let map = mapping(normalize(raw));
        assert_eq!(map["client_name"], json!(null));
    }

    #[test]
    fn test_round_trip() {
        let original = json!({
            "client_name": "Acme Corp",
            "invoice_amount": 120.0,
            "product_name": null
        });
        let serialized = serde_json::to_string(&original).unwrap();
        let map = mapping(normalize(&serialized));
        assert_eq!(Value::Object(map), original);
    }

    #[test]
    fn test_non_json_text_returned_unchanged() {
        assert_eq!(
            normalize("no structured data here"),
            Normalized::Raw("no structured data here".to_string())
        );
    }

    #[test]
    fn test_empty_text_returned_unchanged() {
        assert_eq!(normalize(""), Normalized::Raw(String::new()));
    }

    #[test]
    fn test_unbalanced_braces_not_recovered() {
        // Greedy span from first { to last } does not parse; documented
        // limitation of the fallback.
        let raw = "{\"a\": 1} and {\"b\": ";
        assert_eq!(normalize(raw), Normalized::Raw(raw.to_string()));
    }

    #[test]
    fn test_json_array_is_not_a_mapping() {
        let raw = "[1, 2, 3]";
        assert_eq!(normalize(raw), Normalized::Raw(raw.to_string()));
    }
}
