//! Tool-capability allow-list filtering

use invox_domain::ToolCapability;

/// Keep only the advertised capabilities whose names appear in the
/// allow-list, preserving the advertised order.
///
/// Capabilities outside the list are never offered to the model, even when
/// the tool-execution session advertises them.
pub fn filter_capabilities(
    advertised: Vec<ToolCapability>,
    allowlist: &[String],
) -> Vec<ToolCapability> {
    advertised
        .into_iter()
        .filter(|tool| allowlist.iter().any(|name| name == &tool.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn capability(name: &str) -> ToolCapability {
        ToolCapability {
            name: name.to_string(),
            description: format!("tool {name}"),
            input_schema: json!({"type": "object"}),
        }
    }

    #[test]
    fn test_filters_out_unlisted_capabilities() {
        let advertised = vec![capability("A"), capability("B"), capability("C")];
        let allowlist = vec!["A".to_string(), "C".to_string()];

        let offered = filter_capabilities(advertised, &allowlist);
        let names: Vec<&str> = offered.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_empty_allowlist_offers_nothing() {
        let advertised = vec![capability("A")];
        assert!(filter_capabilities(advertised, &[]).is_empty());
    }

    #[test]
    fn test_allowlist_entries_without_match_are_ignored() {
        let advertised = vec![capability("A")];
        let allowlist = vec!["A".to_string(), "missing".to_string()];
        assert_eq!(filter_capabilities(advertised, &allowlist).len(), 1);
    }
}
