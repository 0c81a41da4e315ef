use crate::adapters::survey::load_surveys;
use crate::adapters::workbook::{load_sheet, require_column};
use crate::config::ExamplesSettings;
use crate::core::output::write_outputs;
use crate::domain::model::{Sheet, Survey, Table, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::services::consensus::consensus;
use crate::utils::error::{EtlError, Result};

pub struct ExamplesInput {
    pub sheet: Sheet,
    pub column: usize,
    pub surveys: Vec<Survey>,
}

/// 例字歸納：每格例字取各點最常見的聲母或韻母，少數讀法寫入批註
pub struct ExamplesPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) settings: ExamplesSettings,
}

impl<S: Storage, C: ConfigProvider> ExamplesPipeline<S, C> {
    pub fn new(storage: S, config: C, settings: ExamplesSettings) -> Self {
        Self {
            storage,
            config,
            settings,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExamplesPipeline<S, C> {
    type Input = ExamplesInput;

    fn name(&self) -> &str {
        "examples"
    }

    async fn extract(&self) -> Result<ExamplesInput> {
        let settings = &self.settings;
        tracing::info!("📖 Reading example characters from {}", settings.workbook);
        let sheet = load_sheet(&self.storage, &settings.workbook, settings.sheet.as_deref()).await?;
        let column = require_column(&sheet, &settings.workbook, &settings.column)?;

        let surveys = load_surveys(&self.storage, &settings.surveys).await;
        if surveys.is_empty() {
            return Err(EtlError::ProcessingError {
                message: "No survey file could be loaded".to_string(),
            });
        }
        Ok(ExamplesInput {
            sheet,
            column,
            surveys,
        })
    }

    async fn transform(&self, input: ExamplesInput) -> Result<TransformResult> {
        let feature = self.settings.feature;
        let ExamplesInput {
            sheet,
            column,
            surveys,
        } = input;

        let mut table = Table::new(format!("{}_{}", self.settings.column, feature.label()));
        let mut header = vec![self.settings.column.clone()];
        header.extend(surveys.iter().map(|s| s.name.clone()));
        table.push_row(header);

        let mut annotated = 0usize;
        for row in 0..sheet.rows.len() {
            let cell = sheet.value(row, column);
            let results: Vec<_> = surveys
                .iter()
                .map(|survey| consensus(cell, survey, feature))
                .collect();

            let mut values = vec![cell.to_string()];
            values.extend(results.iter().map(|r| r.value.clone()));
            let index = table.push_row(values);

            for (i, result) in results.iter().enumerate() {
                if !result.annotation.is_empty() {
                    table.annotate(index, i + 1, &result.annotation);
                    annotated += 1;
                }
            }
        }

        tracing::info!(
            "🧮 {} example cells across {} surveys, {} with minority readings",
            sheet.rows.len(),
            surveys.len(),
            annotated
        );

        Ok(TransformResult {
            tables: vec![table],
            summary: serde_json::json!({
                "feature": feature.label(),
                "examples": sheet.rows.len(),
                "surveys": surveys.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
                "annotated_cells": annotated,
            }),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        write_outputs(&self.storage, &self.config, self.name(), &result).await
    }
}
