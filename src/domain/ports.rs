use crate::domain::model::{FetchedDocument, OutputTarget, RuleSource, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 供日誌與回傳值使用的完整路徑
    fn full_path(&self, path: &str) -> String;
}

pub trait SourceFetcher: Send + Sync {
    fn fetch(
        &self,
        source: &RuleSource,
    ) -> impl std::future::Future<Output = Result<FetchedDocument>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownLinePolicy {
    Drop,
    Keep,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailurePolicy {
    Abort,
    Skip,
}

/// 群組定義：名稱、依序的來源與各輸出目標的檔名
#[derive(Debug, Clone)]
pub struct GroupPlan {
    pub name: String,
    pub sources: Vec<RuleSource>,
    pub surge_file: String,
    pub quanx_file: String,
}

impl GroupPlan {
    pub fn file_name(&self, target: OutputTarget) -> &str {
        match target {
            OutputTarget::Surge => &self.surge_file,
            OutputTarget::QuantumultX => &self.quanx_file,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn groups(&self) -> Vec<GroupPlan>;
    fn output_dir(&self) -> &str;
    fn targets(&self) -> Vec<OutputTarget>;
    fn concurrent_requests(&self) -> usize;
    fn exclude_contains(&self) -> &[String];
    fn exclude_regex(&self) -> &[String];
    fn keep_ip_rules(&self) -> bool;
    fn unknown_lines(&self) -> UnknownLinePolicy;
    fn on_fetch_failure(&self) -> FetchFailurePolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<FetchedDocument>>;
    async fn transform(&self, documents: Vec<FetchedDocument>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<Vec<String>>;
}
