use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct RulesetEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> RulesetEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 依序執行 fetch → filter/merge → write。任何階段失敗都不會寫入檔案
    pub async fn run(&self) -> Result<Vec<String>> {
        let started = Instant::now();
        tracing::info!("🚀 Starting ruleset run");

        tracing::info!("📡 Fetching sources...");
        let documents = self.pipeline.extract().await?;
        tracing::info!("Fetched {} documents", documents.len());

        tracing::info!("🛠️ Filtering and merging groups...");
        let result = self.pipeline.transform(documents).await?;
        tracing::info!(
            "Built {} groups, {} output files",
            result.groups.len(),
            result.files.len()
        );

        // 全部群組成功後才寫檔
        tracing::info!("💾 Writing output files...");
        let written = self.pipeline.load(result).await?;
        tracing::info!(
            "Wrote {} files in {:.2?}",
            written.len(),
            started.elapsed()
        );

        Ok(written)
    }
}
