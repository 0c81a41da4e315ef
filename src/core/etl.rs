use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 依序執行 extract → transform → load，並在各階段之間記錄資源使用
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        let name = self.pipeline.name();
        tracing::info!("🚀 Starting {} job", name);
        self.monitor.log_stats("Job started");

        tracing::info!("📥 Extracting...");
        let input = self.pipeline.extract().await?;
        self.monitor.log_stats("Extract completed");

        tracing::info!("🔄 Transforming...");
        let result = self.pipeline.transform(input).await?;
        tracing::info!(
            "🔄 Produced {} tables with {} rows",
            result.tables.len(),
            result.row_count()
        );
        self.monitor.log_stats("Transform completed");

        tracing::info!("💾 Loading...");
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Load completed");
        self.monitor.log_final_stats();

        tracing::info!("✅ {} job finished: {}", name, output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Table, TransformResult};
    use crate::utils::error::EtlError;
    use async_trait::async_trait;

    struct FixedPipeline {
        fail_transform: bool,
    }

    #[async_trait]
    impl Pipeline for FixedPipeline {
        type Input = Vec<String>;

        fn name(&self) -> &str {
            "fixed"
        }

        async fn extract(&self) -> Result<Vec<String>> {
            Ok(vec!["東".to_string(), "西".to_string()])
        }

        async fn transform(&self, input: Vec<String>) -> Result<TransformResult> {
            if self.fail_transform {
                return Err(EtlError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            let mut table = Table::new("chars");
            for c in input {
                table.push_row(vec![c]);
            }
            Ok(TransformResult {
                tables: vec![table],
                summary: serde_json::json!({}),
            })
        }

        async fn load(&self, result: TransformResult) -> Result<String> {
            Ok(format!("{} rows", result.row_count()))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = EtlEngine::new_with_monitoring(
            FixedPipeline {
                fail_transform: false,
            },
            true,
        );
        assert_eq!(engine.run().await.unwrap(), "2 rows");
    }

    #[tokio::test]
    async fn test_engine_propagates_errors() {
        let engine = EtlEngine::new(FixedPipeline {
            fail_transform: true,
        });
        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
    }
}
