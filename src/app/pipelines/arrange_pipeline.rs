use crate::adapters::survey::{load_survey, survey_name};
use crate::adapters::workbook::{load_sheet, require_column};
use crate::app::pipelines::load_location_context;
use crate::config::{ArrangeSettings, LocationSettings};
use crate::core::output::write_outputs;
use crate::domain::model::{Sheet, Survey, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::services::extractor::phonetic_map;
use crate::domain::services::hierarchy::{arrange, build_entries, ArrangeOptions, SurveyColumn};
use crate::domain::services::location::{select_surveys, PartitionFilter};
use crate::domain::services::merge::MergeTable;
use crate::utils::error::Result;
use std::collections::HashMap;

pub struct ArrangeInput {
    pub sheet: Sheet,
    pub character_column: usize,
    pub category_column: usize,
    /// None 為分區之間的空欄
    pub surveys: Vec<Option<Survey>>,
}

/// 層級整理：按層級表把各點的聲韻與轄字排成每級一張表
pub struct ArrangePipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) settings: ArrangeSettings,
    pub(crate) locations: LocationSettings,
}

impl<S: Storage, C: ConfigProvider> ArrangePipeline<S, C> {
    pub fn new(storage: S, config: C, settings: ArrangeSettings, locations: LocationSettings) -> Self {
        Self {
            storage,
            config,
            settings,
            locations,
        }
    }

    /// 以檔名比對簡稱表，回傳依分區排好的檔案路徑
    async fn selected_paths(&self) -> Result<Vec<Option<String>>> {
        let (table, converters) = load_location_context(&self.storage, &self.locations).await?;

        let mut path_by_name: HashMap<String, &String> = HashMap::new();
        let mut names = Vec::with_capacity(self.settings.surveys.len());
        for path in &self.settings.surveys {
            let name = survey_name(path);
            if path_by_name.contains_key(&name) {
                tracing::warn!("⚠️ Survey {} listed twice, keeping the first file", name);
                continue;
            }
            path_by_name.insert(name.clone(), path);
            names.push(name);
        }

        let filter = PartitionFilter::parse(&self.locations.partitions);
        let selected = select_surveys(&names, &table, &converters, &filter);
        Ok(selected
            .into_iter()
            .map(|slot| slot.and_then(|name| path_by_name.get(&name).map(|p| p.to_string())))
            .collect())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ArrangePipeline<S, C> {
    type Input = ArrangeInput;

    fn name(&self) -> &str {
        "arrange"
    }

    async fn extract(&self) -> Result<ArrangeInput> {
        let settings = &self.settings;
        tracing::info!("📖 Reading hierarchy sheet '{}' from {}", settings.sheet, settings.workbook);
        let sheet = load_sheet(&self.storage, &settings.workbook, Some(&settings.sheet)).await?;
        let character_column = require_column(&sheet, &settings.workbook, &settings.character_column)?;
        let category_column = require_column(&sheet, &settings.workbook, &settings.category_column)?;

        let mut surveys = Vec::new();
        for slot in self.selected_paths().await? {
            match slot {
                None => surveys.push(None),
                Some(path) => match load_survey(&self.storage, &path).await {
                    Ok(survey) => surveys.push(Some(survey)),
                    Err(e) => tracing::warn!("⚠️ Skipping survey {}: {}", path, e),
                },
            }
        }

        let loaded = surveys.iter().flatten().count();
        if loaded == 0 {
            tracing::warn!("⚠️ No survey matched the abbreviation table, writing hierarchy keys only");
        }
        Ok(ArrangeInput {
            sheet,
            character_column,
            category_column,
            surveys,
        })
    }

    async fn transform(&self, input: ArrangeInput) -> Result<TransformResult> {
        let settings = &self.settings;
        let sheet = &input.sheet;
        let (entries, max_level) = build_entries(
            (0..sheet.rows.len())
                .map(|row| (sheet.value(row, input.character_column), sheet.value(row, input.category_column))),
        );
        tracing::debug!("{} hierarchy entries over {} levels", entries.len(), max_level);

        let columns: Vec<SurveyColumn> = input
            .surveys
            .iter()
            .map(|slot| match slot {
                None => SurveyColumn::Placeholder,
                Some(survey) => SurveyColumn::Location {
                    name: survey.name.clone(),
                    phonetics: phonetic_map(survey, settings.feature),
                },
            })
            .collect();

        let options = ArrangeOptions {
            category: settings.category_column.clone(),
            small_class_ratio: settings.small_class_ratio,
            merge: MergeTable::default().with_groups(&settings.merge_groups),
        };
        let tables = arrange(&entries, max_level, &columns, &options);

        tracing::info!("🗂️ Arranged {} characters into {} level tables", entries.len(), tables.len());
        let locations: Vec<&str> = input.surveys.iter().flatten().map(|s| s.name.as_str()).collect();
        Ok(TransformResult {
            tables,
            summary: serde_json::json!({
                "feature": settings.feature.label(),
                "category": settings.category_column,
                "levels": max_level,
                "characters": entries.len(),
                "locations": locations,
                "partitions": self.locations.partitions,
            }),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        write_outputs(&self.storage, &self.config, self.name(), &result).await
    }
}
