use serde::{Deserialize, Serialize};
use std::fmt;

/// 規則類型，例如 `DOMAIN-SUFFIX`、`IP-CIDR`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Domain,
    DomainSuffix,
    DomainKeyword,
    DomainWildcard,
    IpCidr,
    IpCidr6,
    /// 其他大寫關鍵字，原樣保留
    Other(String),
}

impl RuleKind {
    pub fn parse(token: &str) -> Self {
        let upper = token.trim().to_ascii_uppercase();
        match upper.as_str() {
            "DOMAIN" => RuleKind::Domain,
            "DOMAIN-SUFFIX" => RuleKind::DomainSuffix,
            "DOMAIN-KEYWORD" => RuleKind::DomainKeyword,
            "DOMAIN-WILDCARD" => RuleKind::DomainWildcard,
            "IP-CIDR" => RuleKind::IpCidr,
            "IP-CIDR6" => RuleKind::IpCidr6,
            _ => RuleKind::Other(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Domain => "DOMAIN",
            RuleKind::DomainSuffix => "DOMAIN-SUFFIX",
            RuleKind::DomainKeyword => "DOMAIN-KEYWORD",
            RuleKind::DomainWildcard => "DOMAIN-WILDCARD",
            RuleKind::IpCidr => "IP-CIDR",
            RuleKind::IpCidr6 => "IP-CIDR6",
            RuleKind::Other(name) => name.as_str(),
        }
    }

    pub fn is_ip_cidr(&self) -> bool {
        matches!(self, RuleKind::IpCidr | RuleKind::IpCidr6)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單行規則。`Verbatim` 代表無法分類但依策略原樣保留的行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEntry {
    Rule {
        raw: String,
        kind: RuleKind,
        value: String,
    },
    Verbatim { raw: String },
}

impl RuleEntry {
    pub fn new(kind: RuleKind, value: impl Into<String>) -> Self {
        let value = value.into();
        RuleEntry::Rule {
            raw: format!("{},{}", kind, value),
            kind,
            value,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            RuleEntry::Rule { raw, .. } | RuleEntry::Verbatim { raw } => raw,
        }
    }

    pub fn kind(&self) -> Option<&RuleKind> {
        match self {
            RuleEntry::Rule { kind, .. } => Some(kind),
            RuleEntry::Verbatim { .. } => None,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            RuleEntry::Rule { value, .. } => value,
            RuleEntry::Verbatim { raw } => raw,
        }
    }

    /// 去重用的正規化文字：小寫的 `KIND,value`
    pub fn normalized(&self) -> String {
        match self {
            RuleEntry::Rule { kind, value, .. } => {
                format!("{},{}", kind.as_str(), value).to_ascii_lowercase()
            }
            RuleEntry::Verbatim { raw } => raw.trim().to_ascii_lowercase(),
        }
    }
}

/// 行的分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Rule(RuleEntry),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    pub name: String,
    pub url: String,
}

impl RuleSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source: RuleSource,
    pub text: String,
}

/// 合併後的規則群組，條目的正規化文字互不相同
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup {
    pub name: String,
    pub entries: Vec<RuleEntry>,
}

impl RuleGroup {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputTarget {
    #[serde(rename = "surge")]
    Surge,
    #[serde(rename = "quanx")]
    QuantumultX,
}

impl OutputTarget {
    pub const ALL: [OutputTarget; 2] = [OutputTarget::Surge, OutputTarget::QuantumultX];

    pub fn id(&self) -> &'static str {
        match self {
            OutputTarget::Surge => "surge",
            OutputTarget::QuantumultX => "quanx",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputTarget::Surge => "conf",
            OutputTarget::QuantumultX => "snippet",
        }
    }

    pub fn default_file_name(&self, group: &str) -> String {
        match self {
            OutputTarget::Surge => format!("{}_for_Surge.{}", group, self.extension()),
            OutputTarget::QuantumultX => format!("{}_for_QX.{}", group, self.extension()),
        }
    }
}

/// 已渲染但尚未寫入的輸出檔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub group: String,
    pub target: OutputTarget,
    pub file_name: String,
    pub content: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub groups: Vec<RuleGroup>,
    pub files: Vec<RenderedFile>,
}
