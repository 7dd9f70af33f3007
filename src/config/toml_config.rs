use crate::adapters::http::{DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use crate::domain::model::{OutputTarget, RuleSource};
use crate::domain::ports::{ConfigProvider, FetchFailurePolicy, GroupPlan, UnknownLinePolicy};
use crate::utils::error::{RulesetError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OUTPUT_DIR: &str = "generated";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesetConfig {
    pub job: JobConfig,
    pub fetch: Option<FetchConfig>,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub error_handling: Option<ErrorHandlingConfig>,
    pub mirror: Option<MirrorConfig>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: Option<u64>,
    pub concurrent_requests: Option<usize>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub exclude_contains: Vec<String>,
    #[serde(default)]
    pub exclude_regex: Vec<String>,
    pub keep_ip_rules: Option<bool>,
    /// "drop" | "keep" | "error"
    pub unknown_lines: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    #[serde(default = "default_targets")]
    pub targets: Vec<OutputTarget>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            targets: default_targets(),
        }
    }
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_targets() -> Vec<OutputTarget> {
    OutputTarget::ALL.to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    /// "abort" | "skip"
    pub on_fetch_failure: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub enabled: Option<bool>,
    pub root_url: String,
    pub dest: String,
}

impl MirrorConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// 來源可寫成單純的 URL 字串，或 `{ name = "...", url = "..." }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceEntry {
    Url(String),
    Detailed { name: Option<String>, url: String },
}

impl SourceEntry {
    pub fn url(&self) -> &str {
        match self {
            SourceEntry::Url(url) | SourceEntry::Detailed { url, .. } => url,
        }
    }

    pub fn to_source(&self) -> RuleSource {
        let name = match self {
            SourceEntry::Detailed {
                name: Some(name), ..
            } => name.clone(),
            _ => source_name_from_url(self.url()),
        };
        RuleSource::new(name, self.url())
    }
}

/// 以 URL 或路徑的最後一段作為來源名稱
fn source_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(trimmed)
        .to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub sources: Vec<SourceEntry>,
    pub surge_file: Option<String>,
    pub quanx_file: Option<String>,
}

impl GroupConfig {
    pub fn to_plan(&self) -> GroupPlan {
        GroupPlan {
            name: self.name.clone(),
            sources: self.sources.iter().map(SourceEntry::to_source).collect(),
            surge_file: self
                .surge_file
                .clone()
                .unwrap_or_else(|| OutputTarget::Surge.default_file_name(&self.name)),
            quanx_file: self
                .quanx_file
                .clone()
                .unwrap_or_else(|| OutputTarget::QuantumultX.default_file_name(&self.name)),
        }
    }
}

impl RulesetConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RulesetError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${RULESET_BASE})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.fetch
            .as_ref()
            .and_then(|f| f.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn user_agent(&self) -> &str {
        self.fetch
            .as_ref()
            .and_then(|f| f.user_agent.as_deref())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn mirror(&self) -> Option<&MirrorConfig> {
        self.mirror.as_ref().filter(|m| m.is_enabled())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("job.name", &self.job.name)?;
        validation::validate_path("output.dir", &self.output.dir)?;

        if let Some(fetch) = &self.fetch {
            if let Some(timeout) = fetch.timeout_seconds {
                validation::validate_range("fetch.timeout_seconds", timeout, 1, 600)?;
            }
            if let Some(concurrent) = fetch.concurrent_requests {
                validation::validate_positive_number("fetch.concurrent_requests", concurrent, 1)?;
            }
        }

        if let Some(policy) = &self.filter.unknown_lines {
            validation::validate_one_of("filter.unknown_lines", policy, &["drop", "keep", "error"])?;
        }
        for pattern in &self.filter.exclude_regex {
            regex::Regex::new(pattern)?;
        }

        if let Some(policy) = self
            .error_handling
            .as_ref()
            .and_then(|e| e.on_fetch_failure.as_deref())
        {
            validation::validate_one_of("error_handling.on_fetch_failure", policy, &["abort", "skip"])?;
        }

        if self.output.targets.is_empty() {
            return Err(RulesetError::ConfigValidationError {
                field: "output.targets".to_string(),
                message: "At least one output target is required".to_string(),
            });
        }

        if let Some(mirror) = self.mirror() {
            validation::validate_url("mirror.root_url", &mirror.root_url)?;
            validation::validate_path("mirror.dest", &mirror.dest)?;
        }

        if self.groups.is_empty() {
            return Err(RulesetError::MissingConfigError {
                field: "groups".to_string(),
            });
        }
        validation::validate_unique("groups.name", self.groups.iter().map(|g| g.name.as_str()))?;

        let mut file_names = Vec::new();
        for group in &self.groups {
            validation::validate_non_empty_string("groups.name", &group.name)?;
            if group.sources.is_empty() {
                return Err(RulesetError::ConfigValidationError {
                    field: format!("groups.{}.sources", group.name),
                    message: "A group needs at least one source".to_string(),
                });
            }
            for source in &group.sources {
                validation::validate_source_location(
                    &format!("groups.{}.sources", group.name),
                    source.url(),
                )?;
            }

            let plan = group.to_plan();
            for target in &self.output.targets {
                let name = plan.file_name(*target).to_string();
                validation::validate_file_name(&format!("groups.{}.{}_file", group.name, target.id()), &name)?;
                file_names.push(name);
            }
        }
        validation::validate_unique("output file names", file_names.iter().map(String::as_str))?;

        Ok(())
    }
}

impl ConfigProvider for RulesetConfig {
    fn groups(&self) -> Vec<GroupPlan> {
        self.groups.iter().map(GroupConfig::to_plan).collect()
    }

    fn output_dir(&self) -> &str {
        &self.output.dir
    }

    fn targets(&self) -> Vec<OutputTarget> {
        self.output.targets.clone()
    }

    fn concurrent_requests(&self) -> usize {
        self.fetch
            .as_ref()
            .and_then(|f| f.concurrent_requests)
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    fn exclude_contains(&self) -> &[String] {
        &self.filter.exclude_contains
    }

    fn exclude_regex(&self) -> &[String] {
        &self.filter.exclude_regex
    }

    fn keep_ip_rules(&self) -> bool {
        self.filter.keep_ip_rules.unwrap_or(false)
    }

    fn unknown_lines(&self) -> UnknownLinePolicy {
        match self.filter.unknown_lines.as_deref() {
            Some("keep") => UnknownLinePolicy::Keep,
            Some("error") => UnknownLinePolicy::Error,
            _ => UnknownLinePolicy::Drop,
        }
    }

    fn on_fetch_failure(&self) -> FetchFailurePolicy {
        match self
            .error_handling
            .as_ref()
            .and_then(|e| e.on_fetch_failure.as_deref())
        {
            Some("skip") => FetchFailurePolicy::Skip,
            _ => FetchFailurePolicy::Abort,
        }
    }
}

impl Validate for RulesetConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
