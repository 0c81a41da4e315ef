use crate::adapters::LocalStorage;
use crate::app::pipelines::{ArrangePipeline, ExamplesPipeline, ExtractPipeline, FrequencyPipeline};
use crate::config::{Job, OutputSettings};
use crate::core::etl::EtlEngine;
use crate::utils::error::Result;

/// 依工作種類組出對應的 pipeline，以本機檔案系統執行
pub async fn run_job(job: Job, output: OutputSettings, monitor: bool) -> Result<String> {
    let storage = LocalStorage::new(output.output_path.clone());
    tracing::debug!("Running {} job, output under {}", job.name(), output.output_path);

    match job {
        Job::Extract(settings) => {
            let pipeline = ExtractPipeline::new(storage, output, settings);
            EtlEngine::new_with_monitoring(pipeline, monitor).run().await
        }
        Job::Examples(settings) => {
            let pipeline = ExamplesPipeline::new(storage, output, settings);
            EtlEngine::new_with_monitoring(pipeline, monitor).run().await
        }
        Job::Arrange {
            settings,
            locations,
        } => {
            let pipeline = ArrangePipeline::new(storage, output, settings, locations);
            EtlEngine::new_with_monitoring(pipeline, monitor).run().await
        }
        Job::Frequency {
            settings,
            locations,
        } => {
            let pipeline = FrequencyPipeline::new(storage, output, settings, locations);
            EtlEngine::new_with_monitoring(pipeline, monitor).run().await
        }
    }
}
