use crate::adapters::http::HttpFetcher;
use crate::adapters::storage::LocalStorage;
use crate::config::RulesetConfig;
use crate::core::engine::RulesetEngine;
use crate::core::mirror::DirectoryMirror;
use crate::core::pipeline::RulesetPipeline;
use crate::core::ConfigProvider;
use crate::utils::error::Result;

/// 執行一次完整的規則處理：可選的目錄鏡像，接著 fetch → merge → write
pub async fn run_job(config: RulesetConfig) -> Result<Vec<String>> {
    let fetcher = HttpFetcher::new(config.timeout_seconds(), config.user_agent())?;

    if let Some(mirror) = config.mirror() {
        let storage = LocalStorage::new(mirror.dest.clone());
        let crawler = DirectoryMirror::new(&fetcher, storage);
        // 鏡像失敗不影響明確列出的遠端來源
        if let Err(e) = crawler.run(&mirror.root_url).await {
            tracing::warn!("⚠️ Mirror failed: {} -- continuing with explicit sources", e);
        }
    }

    let storage = LocalStorage::new(config.output_dir().to_string());
    let pipeline = RulesetPipeline::new(storage, fetcher, config);
    RulesetEngine::new(pipeline).run().await
}
