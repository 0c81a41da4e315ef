use crate::adapters::survey::load_surveys;
use crate::config::ExtractSettings;
use crate::core::output::write_outputs;
use crate::domain::model::{CharSelection, Survey, Table, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::services::extractor::extract;
use crate::utils::error::{EtlError, Result};

/// 逐字抽取：每個字表輸出一張「漢字 / 音標 / 分類值」表
pub struct ExtractPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) settings: ExtractSettings,
}

impl<S: Storage, C: ConfigProvider> ExtractPipeline<S, C> {
    pub fn new(storage: S, config: C, settings: ExtractSettings) -> Self {
        Self {
            storage,
            config,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExtractPipeline<S, C> {
    type Input = Vec<Survey>;

    fn name(&self) -> &str {
        "extract"
    }

    async fn extract(&self) -> Result<Vec<Survey>> {
        tracing::info!("📂 Loading {} survey files", self.settings.surveys.len());
        let surveys = load_surveys(&self.storage, &self.settings.surveys).await;
        if surveys.is_empty() {
            return Err(EtlError::ProcessingError {
                message: "No survey file could be loaded".to_string(),
            });
        }
        Ok(surveys)
    }

    async fn transform(&self, surveys: Vec<Survey>) -> Result<TransformResult> {
        let feature = self.settings.feature;
        let selection = CharSelection::parse(&self.settings.characters);
        let mut tables = Vec::with_capacity(surveys.len());
        let mut details = Vec::with_capacity(surveys.len());

        for survey in &surveys {
            let extractions = extract(survey, feature, &selection);

            let mut table = Table::new(survey.name.clone());
            table.push_row(vec![
                "漢字".to_string(),
                "音標".to_string(),
                feature.label().to_string(),
            ]);
            for extraction in &extractions {
                table.push_row(vec![
                    extraction.character.clone(),
                    extraction.transcription.clone(),
                    extraction.value.clone(),
                ]);
            }

            tracing::info!(
                "🔤 {}: {} {} values",
                survey.name,
                extractions.len(),
                feature.label()
            );
            details.push(serde_json::json!({
                "survey": survey.name,
                "readings": survey.len(),
                "values": extractions.len(),
            }));
            tables.push(table);
        }

        Ok(TransformResult {
            tables,
            summary: serde_json::json!({
                "feature": feature.label(),
                "surveys": details,
            }),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        write_outputs(&self.storage, &self.config, self.name(), &result).await
    }
}
