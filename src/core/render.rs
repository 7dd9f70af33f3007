use crate::domain::model::{OutputTarget, RuleEntry, RuleGroup, RuleKind};

fn quanx_kind(kind: &RuleKind) -> String {
    match kind {
        RuleKind::DomainSuffix => "host-suffix".to_string(),
        RuleKind::Domain => "host".to_string(),
        RuleKind::DomainKeyword => "host-keyword".to_string(),
        RuleKind::DomainWildcard => "host-wildcard".to_string(),
        other => other.as_str().to_ascii_lowercase(),
    }
}

/// 依目標格式渲染單一條目
pub fn render_entry(entry: &RuleEntry, target: OutputTarget) -> String {
    match entry {
        RuleEntry::Verbatim { raw } => raw.clone(),
        RuleEntry::Rule { kind, value, .. } => match target {
            OutputTarget::Surge => format!("{},{}", kind, value),
            OutputTarget::QuantumultX => format!("{},{}", quanx_kind(kind), value),
        },
    }
}

/// 渲染整個群組：每行一條，結尾保留換行
pub fn render_group(group: &RuleGroup, target: OutputTarget) -> String {
    let lines: Vec<String> = group
        .entries
        .iter()
        .map(|entry| render_entry(entry, target))
        .collect();
    format!("{}\n", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> RuleGroup {
        RuleGroup {
            name: "AI_Global".to_string(),
            entries: vec![
                RuleEntry::new(RuleKind::DomainSuffix, "openai.com"),
                RuleEntry::new(RuleKind::Domain, "api.anthropic.com"),
                RuleEntry::new(RuleKind::DomainKeyword, "gemini"),
                RuleEntry::new(RuleKind::DomainWildcard, "*.claude.ai"),
                RuleEntry::new(RuleKind::IpCidr, "1.1.1.0/24,no-resolve"),
                RuleEntry::Verbatim {
                    raw: "custom rule text".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_render_surge() {
        let output = render_group(&group(), OutputTarget::Surge);
        assert_eq!(
            output,
            "DOMAIN-SUFFIX,openai.com\n\
             DOMAIN,api.anthropic.com\n\
             DOMAIN-KEYWORD,gemini\n\
             DOMAIN-WILDCARD,*.claude.ai\n\
             IP-CIDR,1.1.1.0/24,no-resolve\n\
             custom rule text\n"
        );
    }

    #[test]
    fn test_render_quanx() {
        let output = render_group(&group(), OutputTarget::QuantumultX);
        assert_eq!(
            output,
            "host-suffix,openai.com\n\
             host,api.anthropic.com\n\
             host-keyword,gemini\n\
             host-wildcard,*.claude.ai\n\
             ip-cidr,1.1.1.0/24,no-resolve\n\
             custom rule text\n"
        );
    }

    #[test]
    fn test_render_other_kind_is_lowercased_for_quanx() {
        let entry = RuleEntry::new(RuleKind::parse("DOMAIN-REGEX"), "^ads\\.");
        assert_eq!(render_entry(&entry, OutputTarget::Surge), "DOMAIN-REGEX,^ads\\.");
        assert_eq!(render_entry(&entry, OutputTarget::QuantumultX), "domain-regex,^ads\\.");
    }

    #[test]
    fn test_render_empty_group() {
        let empty = RuleGroup {
            name: "empty".to_string(),
            entries: Vec::new(),
        };
        assert_eq!(render_group(&empty, OutputTarget::Surge), "\n");
    }
}
