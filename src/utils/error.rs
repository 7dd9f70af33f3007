use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesetError {
    #[error("Failed to fetch source '{source_name}' ({url}): {message}")]
    FetchError {
        source_name: String,
        url: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {status} from {url}")]
    HttpStatusError {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Unrecognized rule in '{source_name}' at line {line_number}: {line}")]
    ParseError {
        source_name: String,
        line_number: usize,
        line: String,
    },

    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid exclusion pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Filesystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 外部來源暫時失敗，下次排程可能恢復
    Medium,
    High,
    Critical,
}

impl RulesetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RulesetError::FetchError { .. }
            | RulesetError::HttpError(_)
            | RulesetError::HttpStatusError { .. } => ErrorCategory::Network,
            RulesetError::ParseError { .. } => ErrorCategory::Data,
            RulesetError::WriteError { .. } | RulesetError::IoError(_) => ErrorCategory::Filesystem,
            RulesetError::RegexError(_)
            | RulesetError::UrlError(_)
            | RulesetError::TomlError(_)
            | RulesetError::ConfigError { .. }
            | RulesetError::ConfigValidationError { .. }
            | RulesetError::InvalidConfigValueError { .. }
            | RulesetError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Filesystem => ErrorSeverity::Critical,
        }
    }

    /// 對應的程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RulesetError::FetchError { .. }
            | RulesetError::HttpError(_)
            | RulesetError::HttpStatusError { .. } => {
                "Check that the source URL is reachable, or set error_handling.on_fetch_failure = \"skip\""
            }
            RulesetError::ParseError { .. } => {
                "Add an exclusion pattern for the line, or set filter.unknown_lines to \"drop\" or \"keep\""
            }
            RulesetError::WriteError { .. } | RulesetError::IoError(_) => {
                "Check that the output directory exists and is writable"
            }
            RulesetError::RegexError(_) => "Fix the regular expression in filter.exclude_regex",
            _ => "Review the configuration file and fix the reported field",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RulesetError::FetchError { source_name, .. } => {
                format!("Could not download rule source '{}'", source_name)
            }
            RulesetError::ParseError {
                source_name,
                line_number,
                ..
            } => format!(
                "Rule source '{}' contains an unrecognized line ({})",
                source_name, line_number
            ),
            RulesetError::WriteError { path, .. } => {
                format!("Could not write output file '{}'", path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RulesetError>;
