use crate::adapters::workbook::{load_sheet, require_column};
use crate::app::pipelines::load_location_context;
use crate::config::{FrequencySettings, LocationSettings};
use crate::core::output::write_outputs;
use crate::domain::model::{Sheet, TransformResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::services::frequency::{compute, location_names};
use crate::domain::services::location::{sort_locations, LocationSlot, UNMATCHED_SEPARATOR};
use crate::utils::error::{EtlError, Result};

pub struct FrequencyInput {
    pub sheet: Sheet,
    pub slots: Vec<LocationSlot>,
    pub order: Vec<String>,
}

/// 聲韻頻率：統計表中每個地點各聲韻的轄字比例
pub struct FrequencyPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) settings: FrequencySettings,
    pub(crate) locations: LocationSettings,
}

impl<S: Storage, C: ConfigProvider> FrequencyPipeline<S, C> {
    pub fn new(
        storage: S,
        config: C,
        settings: FrequencySettings,
        locations: LocationSettings,
    ) -> Self {
        Self {
            storage,
            config,
            settings,
            locations,
        }
    }

    /// 順序表的排序欄；未設定工作簿時回傳空表，全部按字串排序
    async fn value_order(&self) -> Result<Vec<String>> {
        let Some(workbook) = &self.settings.order_workbook else {
            tracing::debug!("No order workbook, values sorted by text");
            return Ok(Vec::new());
        };
        let sheet = load_sheet(&self.storage, workbook, Some(&self.settings.order_sheet)).await?;
        require_column(&sheet, workbook, &self.settings.order_column)?;
        let values = sheet
            .column_values(&self.settings.order_column)
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        tracing::debug!("Loaded {} ordered values from {}", values.len(), workbook);
        Ok(values)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FrequencyPipeline<S, C> {
    type Input = FrequencyInput;

    fn name(&self) -> &str {
        "frequency"
    }

    async fn extract(&self) -> Result<FrequencyInput> {
        let settings = &self.settings;
        tracing::info!("📖 Reading statistics from {}", settings.statistics);
        let sheet = load_sheet(
            &self.storage,
            &settings.statistics,
            settings.statistics_sheet.as_deref(),
        )
        .await?;

        let names = location_names(&sheet, settings.skip_columns);
        if names.is_empty() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "No '{{location}}_聲韻' column found in {} after skipping {} columns",
                    settings.statistics, settings.skip_columns
                ),
            });
        }

        let (table, converters) = load_location_context(&self.storage, &self.locations).await?;
        let slots = sort_locations(&names, &table, &converters);
        let order = self.value_order().await?;

        Ok(FrequencyInput {
            sheet,
            slots,
            order,
        })
    }

    async fn transform(&self, input: FrequencyInput) -> Result<TransformResult> {
        let report = compute(&input.sheet, input.slots, &input.order);
        let table = report.to_table();

        tracing::info!(
            "📊 {} locations, {} values, {} characters counted",
            report.location_count(),
            report.values.len(),
            report.overall_total()
        );

        let unmatched: Vec<&str> = report
            .slots
            .iter()
            .skip_while(|slot| slot.name != UNMATCHED_SEPARATOR)
            .skip(1)
            .map(|slot| slot.name.as_str())
            .collect();
        if !unmatched.is_empty() {
            tracing::warn!("⚠️ Locations not in the abbreviation table: {}", unmatched.join(", "));
        }

        Ok(TransformResult {
            tables: vec![table],
            summary: serde_json::json!({
                "locations": report.location_count(),
                "values": report.values.len(),
                "characters": report.overall_total(),
                "unmatched": unmatched,
            }),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        write_outputs(&self.storage, &self.config, self.name(), &result).await
    }
}
