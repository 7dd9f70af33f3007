use crate::domain::model::{RuleEntry, RuleGroup, RuleSource};
use std::collections::HashSet;

/// 依來源順序串接並去重，重複時保留第一次出現的條目
pub fn merge_group(name: &str, inputs: Vec<(RuleSource, Vec<RuleEntry>)>) -> RuleGroup {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    let mut duplicates = 0usize;

    for (source, source_entries) in inputs {
        let before = entries.len();
        for entry in source_entries {
            if seen.insert(entry.normalized()) {
                entries.push(entry);
            } else {
                duplicates += 1;
            }
        }
        tracing::debug!(
            "Group '{}': {} new entries from '{}'",
            name,
            entries.len() - before,
            source.name
        );
    }

    tracing::debug!("Group '{}': removed {} duplicates", name, duplicates);

    RuleGroup {
        name: name.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::{filter_document, FilterPolicy};
    use crate::domain::model::RuleKind;

    #[test]
    fn test_merge_example_from_two_sources() {
        let policy = FilterPolicy::default();
        let a = filter_document("DOMAIN,example.com\n# comment\n\n", &policy, "A").unwrap();
        let b = filter_document("DOMAIN,example.com\nDOMAIN,other.com\n", &policy, "B").unwrap();

        let group = merge_group(
            "test",
            vec![
                (RuleSource::new("A", "https://a.example/list"), a),
                (RuleSource::new("B", "https://b.example/list"), b),
            ],
        );

        let raws: Vec<&str> = group.entries.iter().map(|e| e.raw()).collect();
        assert_eq!(raws, vec!["DOMAIN,example.com", "DOMAIN,other.com"]);
    }

    #[test]
    fn test_first_occurrence_wins_across_case() {
        let group = merge_group(
            "case",
            vec![
                (
                    RuleSource::new("first", "a"),
                    vec![RuleEntry::new(RuleKind::DomainSuffix, "Apple.com")],
                ),
                (
                    RuleSource::new("second", "b"),
                    vec![
                        RuleEntry::new(RuleKind::parse("domain-suffix"), "apple.com"),
                        RuleEntry::new(RuleKind::Domain, "apple.com"),
                    ],
                ),
            ],
        );

        assert_eq!(group.len(), 2);
        assert_eq!(group.entries[0].value(), "Apple.com");
        assert_eq!(group.entries[1].kind(), Some(&RuleKind::Domain));
    }

    #[test]
    fn test_merge_preserves_first_seen_order() {
        let entries = |values: &[&str]| -> Vec<RuleEntry> {
            values
                .iter()
                .map(|v| RuleEntry::new(RuleKind::Domain, *v))
                .collect()
        };

        let group = merge_group(
            "order",
            vec![
                (RuleSource::new("x", "x"), entries(&["c.com", "a.com"])),
                (RuleSource::new("y", "y"), entries(&["b.com", "a.com", "c.com", "d.com"])),
            ],
        );

        let values: Vec<&str> = group.entries.iter().map(|e| e.value()).collect();
        assert_eq!(values, vec!["c.com", "a.com", "b.com", "d.com"]);
    }

    #[test]
    fn test_merge_with_no_inputs_is_empty() {
        let group = merge_group("none", Vec::new());
        assert!(group.is_empty());
        assert_eq!(group.name, "none");
    }
}
