pub mod arrange_pipeline;
pub mod examples_pipeline;
pub mod extract_pipeline;
pub mod frequency_pipeline;

pub use arrange_pipeline::ArrangePipeline;
pub use examples_pipeline::ExamplesPipeline;
pub use extract_pipeline::ExtractPipeline;
pub use frequency_pipeline::FrequencyPipeline;

use crate::adapters::abbreviations::load_abbreviations;
use crate::adapters::script::load_converters;
use crate::config::LocationSettings;
use crate::domain::ports::Storage;
use crate::domain::services::location::{AbbreviationTable, Converters};
use crate::utils::error::Result;

/// 簡稱表與字形轉換器，層級整理與頻率統計都需要
pub(crate) async fn load_location_context<S: Storage>(
    storage: &S,
    settings: &LocationSettings,
) -> Result<(AbbreviationTable, Converters)> {
    let table = load_abbreviations(
        storage,
        &settings.abbreviations,
        settings.allow_duplicate_abbreviations,
    )
    .await?;
    let converters = load_converters(storage, &settings.script).await?;
    Ok((table, converters))
}
