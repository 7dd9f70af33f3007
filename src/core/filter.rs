use crate::domain::model::{LineKind, RuleEntry, RuleKind};
use crate::domain::ports::{ConfigProvider, UnknownLinePolicy};
use crate::utils::error::{RulesetError, Result};
use regex::Regex;
use std::net::IpAddr;

const COMMENT_PREFIXES: [&str; 3] = ["#", ";", "//"];

/// 規則類型名稱含有這些片段時視為非網域規則 (IP、埠、程序等)
const NON_DOMAIN_FRAGMENTS: [&str; 6] = ["IP", "PORT", "PROXY", "PROCESS", "USER-AGENT", "FINAL"];

const NON_DOMAIN_KINDS: [&str; 6] = ["AND", "OR", "NOT", "URL-REGEX", "PROTOCOL", "SUBNET"];

/// 行過濾策略
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    pub exclude_contains: Vec<String>,
    pub exclude_regex: Vec<Regex>,
    pub keep_ip_rules: bool,
    pub unknown_lines: UnknownLinePolicy,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            exclude_contains: Vec::new(),
            exclude_regex: Vec::new(),
            keep_ip_rules: false,
            unknown_lines: UnknownLinePolicy::Drop,
        }
    }
}

impl FilterPolicy {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let exclude_regex = config
            .exclude_regex()
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_contains: config.exclude_contains().to_vec(),
            exclude_regex,
            keep_ip_rules: config.keep_ip_rules(),
            unknown_lines: config.unknown_lines(),
        })
    }

    pub fn is_excluded(&self, line: &str) -> bool {
        self.exclude_contains
            .iter()
            .any(|pattern| line.contains(pattern.as_str()))
            || self.exclude_regex.iter().any(|re| re.is_match(line))
    }

    fn accepts(&self, entry: &RuleEntry) -> bool {
        match entry {
            RuleEntry::Verbatim { .. } => true,
            RuleEntry::Rule { kind, value, .. } => {
                if kind.is_ip_cidr() {
                    return self.keep_ip_rules;
                }
                !is_non_domain_kind(kind) && !looks_like_ip(value)
            }
        }
    }
}

fn is_non_domain_kind(kind: &RuleKind) -> bool {
    let name = kind.as_str();
    NON_DOMAIN_KINDS.contains(&name)
        || NON_DOMAIN_FRAGMENTS
            .iter()
            .any(|fragment| name.contains(fragment))
}

/// 值的第一欄 (去掉 CIDR 前綴長度) 是 IPv4 或 IPv6 位址
fn looks_like_ip(value: &str) -> bool {
    let address = value.split(',').next().unwrap_or(value).trim();
    let address = address.split('/').next().unwrap_or(address);
    address.parse::<IpAddr>().is_ok()
}

fn is_comment(trimmed: &str) -> bool {
    COMMENT_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// 去掉行尾註解 (`空白 + #`)
fn strip_inline_comment(line: &str) -> &str {
    for (index, c) in line.char_indices() {
        if c == '#' && line[..index].ends_with(char::is_whitespace) {
            return line[..index].trim_end();
        }
    }
    line
}

fn is_keyword(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// 將單行分類為空行、註解、規則或無法辨識
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if is_comment(trimmed) {
        return LineKind::Comment;
    }

    let content = strip_inline_comment(trimmed);

    if let Some((left, right)) = content.split_once(',') {
        let left = left.trim();
        let value = right.trim();
        if !is_keyword(left) || value.is_empty() {
            return LineKind::Unknown;
        }
        return LineKind::Rule(RuleEntry::Rule {
            raw: content.to_string(),
            kind: RuleKind::parse(left),
            value: value.to_string(),
        });
    }

    // domain-set 格式：每行一個網域
    if content.contains(char::is_whitespace) || content.contains('/') || content.contains(':') {
        return LineKind::Unknown;
    }

    LineKind::Rule(RuleEntry::Rule {
        raw: content.to_string(),
        kind: RuleKind::Domain,
        value: content.to_string(),
    })
}

/// 依策略過濾一份文件，回傳依序保留的規則
pub fn filter_document(text: &str, policy: &FilterPolicy, source_name: &str) -> Result<Vec<RuleEntry>> {
    let mut entries = Vec::new();
    let mut excluded = 0usize;
    let mut dropped = 0usize;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        if policy.is_excluded(trimmed) {
            excluded += 1;
            continue;
        }

        let entry = match classify_line(trimmed) {
            LineKind::Blank | LineKind::Comment => continue,
            LineKind::Rule(entry) => entry,
            LineKind::Unknown => match policy.unknown_lines {
                UnknownLinePolicy::Drop => {
                    tracing::debug!("Dropping unrecognized line {} in '{}': {}", index + 1, source_name, trimmed);
                    dropped += 1;
                    continue;
                }
                UnknownLinePolicy::Keep => RuleEntry::Verbatim {
                    raw: strip_inline_comment(trimmed).to_string(),
                },
                UnknownLinePolicy::Error => {
                    return Err(RulesetError::ParseError {
                        source_name: source_name.to_string(),
                        line_number: index + 1,
                        line: trimmed.to_string(),
                    });
                }
            },
        };

        if policy.accepts(&entry) {
            entries.push(entry);
        } else {
            dropped += 1;
        }
    }

    tracing::debug!(
        "Filtered '{}': {} kept, {} excluded, {} dropped",
        source_name,
        entries.len(),
        excluded,
        dropped
    );

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(entries: &[RuleEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.raw()).collect()
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("   "), LineKind::Blank);
        assert_eq!(classify_line("# comment"), LineKind::Comment);
        assert_eq!(classify_line("// comment"), LineKind::Comment);
        assert_eq!(classify_line("hello world"), LineKind::Unknown);
        assert_eq!(classify_line("https://example.com/path"), LineKind::Unknown);

        match classify_line("domain-suffix, apple.com # cdn") {
            LineKind::Rule(entry) => {
                assert_eq!(entry.kind(), Some(&RuleKind::DomainSuffix));
                assert_eq!(entry.value(), "apple.com");
                assert_eq!(entry.raw(), "domain-suffix, apple.com");
            }
            other => panic!("unexpected {:?}", other),
        }

        match classify_line("cdn.example.com") {
            LineKind::Rule(entry) => {
                assert_eq!(entry.kind(), Some(&RuleKind::Domain));
                assert_eq!(entry.value(), "cdn.example.com");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_only_blank_and_comment_lines_yield_nothing() {
        let text = "\n# header\n   \n; note\n// another\n";
        let entries = filter_document(text, &FilterPolicy::default(), "empty").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_exclusion_patterns() {
        let policy = FilterPolicy {
            exclude_contains: vec![
                "DOMAIN,this_ruleset_is_made_by_sukkaw.ruleset.skk.moe".to_string(),
                "chat.z.ai".to_string(),
            ],
            exclude_regex: vec![Regex::new(r"^DOMAIN-KEYWORD,").unwrap()],
            ..FilterPolicy::default()
        };
        let text = "DOMAIN,this_ruleset_is_made_by_sukkaw.ruleset.skk.moe\n\
                    DOMAIN-SUFFIX,chat.z.ai\n\
                    DOMAIN-KEYWORD,openai\n\
                    DOMAIN-SUFFIX,openai.com\n";

        let entries = filter_document(text, &policy, "ai").unwrap();
        assert_eq!(raws(&entries), vec!["DOMAIN-SUFFIX,openai.com"]);
    }

    #[test]
    fn test_non_domain_rules_are_dropped() {
        let text = "IP-CIDR,1.1.1.0/24,no-resolve\n\
                    GEOIP,CN\n\
                    PROCESS-NAME,curl\n\
                    DEST-PORT,443\n\
                    DOMAIN,10.0.0.1\n\
                    DOMAIN,example.com\n";

        let entries = filter_document(text, &FilterPolicy::default(), "mixed").unwrap();
        assert_eq!(raws(&entries), vec!["DOMAIN,example.com"]);
    }

    #[test]
    fn test_numeric_domains_are_kept() {
        let text = "DOMAIN-SUFFIX,163.com\nDOMAIN-SUFFIX,12306.cn\n360.cn\nDOMAIN-SUFFIX,qq.com\n";

        let entries = filter_document(text, &FilterPolicy::default(), "cn").unwrap();
        assert_eq!(
            raws(&entries),
            vec![
                "DOMAIN-SUFFIX,163.com",
                "DOMAIN-SUFFIX,12306.cn",
                "360.cn",
                "DOMAIN-SUFFIX,qq.com",
            ]
        );
    }

    #[test]
    fn test_keep_ip_rules() {
        let policy = FilterPolicy {
            keep_ip_rules: true,
            ..FilterPolicy::default()
        };
        let text = "IP-CIDR,1.1.1.0/24,no-resolve\nIP-CIDR6,2001:db8::/32\nGEOIP,CN\n";

        let entries = filter_document(text, &policy, "ip").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind(), Some(&RuleKind::IpCidr));
        assert_eq!(entries[1].kind(), Some(&RuleKind::IpCidr6));
    }

    #[test]
    fn test_unknown_line_policies() {
        let text = "DOMAIN,example.com\nnot a rule\n";

        let dropped = filter_document(text, &FilterPolicy::default(), "src").unwrap();
        assert_eq!(dropped.len(), 1);

        let keep = FilterPolicy {
            unknown_lines: UnknownLinePolicy::Keep,
            ..FilterPolicy::default()
        };
        let kept = filter_document(text, &keep, "src").unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1], RuleEntry::Verbatim { raw: "not a rule".to_string() });

        let strict = FilterPolicy {
            unknown_lines: UnknownLinePolicy::Error,
            ..FilterPolicy::default()
        };
        match filter_document(text, &strict, "src") {
            Err(RulesetError::ParseError {
                source_name,
                line_number,
                line,
            }) => {
                assert_eq!(source_name, "src");
                assert_eq!(line_number, 2);
                assert_eq!(line, "not a rule");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_looks_like_ip() {
        assert!(looks_like_ip("192.168.0.1"));
        assert!(looks_like_ip("10.0.0.0/8,no-resolve"));
        assert!(looks_like_ip("2001:db8::/32"));
        assert!(!looks_like_ip("1password.com"));
        assert!(!looks_like_ip("example.com"));
        assert!(!looks_like_ip("163.com"));
        assert!(!looks_like_ip("12306.cn"));
    }
}
