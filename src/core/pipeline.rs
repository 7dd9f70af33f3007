use crate::core::filter::{filter_document, FilterPolicy};
use crate::core::merge::merge_group;
use crate::core::render::render_group;
use crate::core::{
    ConfigProvider, FetchFailurePolicy, FetchedDocument, Pipeline, RenderedFile, SourceFetcher,
    Storage, TransformResult,
};
use crate::domain::model::RuleSource;
use crate::utils::error::Result;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};

pub struct RulesetPipeline<S: Storage, F: SourceFetcher, C: ConfigProvider> {
    storage: S,
    fetcher: F,
    config: C,
}

impl<S: Storage, F: SourceFetcher, C: ConfigProvider> RulesetPipeline<S, F, C> {
    pub fn new(storage: S, fetcher: F, config: C) -> Self {
        Self {
            storage,
            fetcher,
            config,
        }
    }

    /// 所有群組的來源，依 URL 去重並保持設定順序
    fn unique_sources(&self) -> Vec<RuleSource> {
        let mut seen = HashSet::new();
        self.config
            .groups()
            .into_iter()
            .flat_map(|group| group.sources)
            .filter(|source| seen.insert(source.url.clone()))
            .collect()
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: SourceFetcher, C: ConfigProvider> Pipeline for RulesetPipeline<S, F, C> {
    async fn extract(&self) -> Result<Vec<FetchedDocument>> {
        let sources = self.unique_sources();
        let concurrency = self.config.concurrent_requests().max(1);
        tracing::debug!(
            "Fetching {} sources ({} at a time)",
            sources.len(),
            concurrency
        );

        // 先建立所有抓取 future，再以 buffered 保持順序並限制同時請求數
        let fetches: Vec<_> = sources
            .iter()
            .map(|source| self.fetcher.fetch(source))
            .collect();
        let results: Vec<Result<FetchedDocument>> = stream::iter(fetches)
            .buffered(concurrency)
            .collect()
            .await;

        let mut documents = Vec::with_capacity(results.len());
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(document) => documents.push(document),
                Err(e) => match self.config.on_fetch_failure() {
                    FetchFailurePolicy::Abort => return Err(e),
                    FetchFailurePolicy::Skip => {
                        tracing::warn!("⚠️ Skipping source '{}': {}", source.name, e);
                    }
                },
            }
        }

        Ok(documents)
    }

    async fn transform(&self, documents: Vec<FetchedDocument>) -> Result<TransformResult> {
        let policy = FilterPolicy::from_config(&self.config)?;
        let by_url: HashMap<&str, &FetchedDocument> = documents
            .iter()
            .map(|document| (document.source.url.as_str(), document))
            .collect();

        let mut groups = Vec::new();
        let mut files = Vec::new();

        for plan in self.config.groups() {
            let mut inputs = Vec::with_capacity(plan.sources.len());
            for source in &plan.sources {
                let Some(document) = by_url.get(source.url.as_str()) else {
                    tracing::warn!("Group '{}' has no content for '{}'", plan.name, source.name);
                    continue;
                };
                let entries = filter_document(&document.text, &policy, &source.name)?;
                inputs.push((source.clone(), entries));
            }

            let group = merge_group(&plan.name, inputs);
            tracing::info!("🧩 Group '{}': {} entries", group.name, group.len());

            for target in self.config.targets() {
                files.push(RenderedFile {
                    group: group.name.clone(),
                    target,
                    file_name: plan.file_name(target).to_string(),
                    content: render_group(&group, target),
                    entry_count: group.len(),
                });
            }
            groups.push(group);
        }

        Ok(TransformResult { groups, files })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(result.files.len());

        for file in &result.files {
            self.storage
                .write_file(&file.file_name, file.content.as_bytes())
                .await?;
            let full_path = self.storage.full_path(&file.file_name);
            tracing::debug!(
                "Wrote {} entries for '{}' ({}) to {}",
                file.entry_count,
                file.group,
                file.target.id(),
                full_path
            );
            written.push(full_path);
        }

        Ok(written)
    }
}
