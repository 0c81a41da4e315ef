#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::adapters::script::ScriptSettings;
use crate::adapters::workbook::{TABLE_EXTENSIONS, WORKBOOK_EXTENSIONS};
use crate::domain::model::Feature;
use crate::domain::ports::ConfigProvider;
use crate::domain::services::hierarchy::DEFAULT_SMALL_CLASS_RATIO;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_list, validate_non_empty_string, validate_path,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_ARCHIVE_NAME: &str = "shengyun_output.zip";

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

fn default_formats() -> Vec<OutputFormat> {
    vec![OutputFormat::Csv]
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

/// 輸出位置與格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
    #[serde(default)]
    pub compress: bool,
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            formats: default_formats(),
            compress: false,
            archive_name: default_archive_name(),
        }
    }
}

impl ConfigProvider for OutputSettings {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn compress(&self) -> bool {
        self.compress
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

impl Validate for OutputSettings {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_list("formats", &self.formats)?;
        if self.compress {
            validate_file_extensions("archive_name", std::slice::from_ref(&self.archive_name), &["zip"])?;
        }
        Ok(())
    }
}

fn default_partitions() -> String {
    crate::domain::services::location::ALL_PARTITIONS.to_string()
}

/// 簡稱表與地點比對設定（層級整理與頻率統計共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSettings {
    pub abbreviations: String,
    #[serde(default)]
    pub allow_duplicate_abbreviations: bool,
    /// "全部" 或以空白分隔的分區名
    #[serde(default = "default_partitions")]
    pub partitions: String,
    #[serde(default)]
    pub script: ScriptSettings,
}

impl Validate for LocationSettings {
    fn validate(&self) -> Result<()> {
        validate_path("locations.abbreviations", &self.abbreviations)?;
        validate_table_file("locations.abbreviations", &self.abbreviations)?;
        let dictionaries = self
            .script
            .s2t
            .iter()
            .chain(&self.script.t2s)
            .chain(&self.script.variants);
        for file in dictionaries {
            validate_path("locations.script", file)?;
        }
        Ok(())
    }
}

fn validate_table_file(field: &str, path: &str) -> Result<()> {
    let allowed: Vec<&str> = WORKBOOK_EXTENSIONS
        .iter()
        .chain(TABLE_EXTENSIONS)
        .copied()
        .collect();
    validate_file_extensions(field, &[path.to_string()], &allowed)
}

fn validate_surveys(field: &str, surveys: &[String]) -> Result<()> {
    validate_non_empty_list(field, surveys)?;
    validate_file_extensions(field, surveys, &["tsv"])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSettings {
    pub surveys: Vec<String>,
    #[serde(default)]
    pub feature: Feature,
    /// 要查的字，空白或 "全部" 代表字表中所有字
    #[serde(default)]
    pub characters: String,
}

fn default_examples_column() -> String {
    "例字".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamplesSettings {
    pub surveys: Vec<String>,
    pub workbook: String,
    /// 未指定時取第一張工作表
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default = "default_examples_column")]
    pub column: String,
    #[serde(default)]
    pub feature: Feature,
}

fn default_hierarchy_sheet() -> String {
    "層級".to_string()
}

fn default_character_column() -> String {
    "單字".to_string()
}

fn default_category_column() -> String {
    "韻母簡".to_string()
}

fn default_small_class_ratio() -> f64 {
    DEFAULT_SMALL_CLASS_RATIO
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrangeSettings {
    pub surveys: Vec<String>,
    pub workbook: String,
    #[serde(default = "default_hierarchy_sheet")]
    pub sheet: String,
    #[serde(default = "default_character_column")]
    pub character_column: String,
    #[serde(default = "default_category_column")]
    pub category_column: String,
    #[serde(default)]
    pub feature: Feature,
    #[serde(default = "default_small_class_ratio")]
    pub small_class_ratio: f64,
    /// 主類 -> 變體，覆蓋內建的歸併表
    #[serde(default)]
    pub merge_groups: BTreeMap<String, Vec<String>>,
}

fn default_order_sheet() -> String {
    "順序".to_string()
}

fn default_order_column() -> String {
    "送氣".to_string()
}

fn default_skip_columns() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencySettings {
    /// 統計表，表頭為 {地點}_聲韻 / {地點}_轄字
    pub statistics: String,
    #[serde(default)]
    pub statistics_sheet: Option<String>,
    /// 含「順序」工作表的工作簿，不指定則按字串排序
    #[serde(default)]
    pub order_workbook: Option<String>,
    #[serde(default = "default_order_sheet")]
    pub order_sheet: String,
    #[serde(default = "default_order_column")]
    pub order_column: String,
    /// 第一個地點欄之前的欄數
    #[serde(default = "default_skip_columns")]
    pub skip_columns: usize,
}

/// 四種批次工作
#[derive(Debug, Clone)]
pub enum Job {
    Extract(ExtractSettings),
    Examples(ExamplesSettings),
    Arrange {
        settings: ArrangeSettings,
        locations: LocationSettings,
    },
    Frequency {
        settings: FrequencySettings,
        locations: LocationSettings,
    },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::Extract(_) => "extract",
            Job::Examples(_) => "examples",
            Job::Arrange { .. } => "arrange",
            Job::Frequency { .. } => "frequency",
        }
    }
}

impl Validate for Job {
    fn validate(&self) -> Result<()> {
        match self {
            Job::Extract(settings) => validate_surveys("extract.surveys", &settings.surveys),
            Job::Examples(settings) => {
                validate_surveys("examples.surveys", &settings.surveys)?;
                validate_table_file("examples.workbook", &settings.workbook)?;
                validate_non_empty_string("examples.column", &settings.column)
            }
            Job::Arrange {
                settings,
                locations,
            } => {
                validate_surveys("arrange.surveys", &settings.surveys)?;
                validate_table_file("arrange.workbook", &settings.workbook)?;
                validate_non_empty_string("arrange.character_column", &settings.character_column)?;
                validate_non_empty_string("arrange.category_column", &settings.category_column)?;
                validate_range(
                    "arrange.small_class_ratio",
                    settings.small_class_ratio,
                    0.0,
                    1.0,
                )?;
                locations.validate()
            }
            Job::Frequency {
                settings,
                locations,
            } => {
                validate_table_file("frequency.statistics", &settings.statistics)?;
                if let Some(order) = &settings.order_workbook {
                    validate_table_file("frequency.order_workbook", order)?;
                }
                validate_non_empty_string("frequency.order_column", &settings.order_column)?;
                locations.validate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> LocationSettings {
        LocationSettings {
            abbreviations: "簡稱.csv".to_string(),
            allow_duplicate_abbreviations: false,
            partitions: default_partitions(),
            script: ScriptSettings::default(),
        }
    }

    #[test]
    fn test_output_settings_validation() {
        let mut output = OutputSettings::default();
        assert!(output.validate().is_ok());

        output.compress = true;
        output.archive_name = "out.tar".to_string();
        assert!(output.validate().is_err());

        output.formats.clear();
        output.compress = false;
        assert!(output.validate().is_err());
    }

    #[test]
    fn test_extract_requires_tsv_surveys() {
        let job = Job::Extract(ExtractSettings {
            surveys: vec!["廣州.tsv".to_string()],
            feature: Feature::Tone,
            characters: String::new(),
        });
        assert!(job.validate().is_ok());

        let job = Job::Extract(ExtractSettings {
            surveys: vec![],
            feature: Feature::Tone,
            characters: String::new(),
        });
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_arrange_ratio_must_be_fraction() {
        let settings = ArrangeSettings {
            surveys: vec!["廣州.tsv".to_string()],
            workbook: "聲韻.xlsx".to_string(),
            sheet: default_hierarchy_sheet(),
            character_column: default_character_column(),
            category_column: default_category_column(),
            feature: Feature::Vowel,
            small_class_ratio: 7.0,
            merge_groups: BTreeMap::new(),
        };
        let job = Job::Arrange {
            settings,
            locations: locations(),
        };
        assert!(job.validate().is_err());
        assert_eq!(job.name(), "arrange");
    }

    #[test]
    fn test_frequency_checks_table_extensions() {
        let job = Job::Frequency {
            settings: FrequencySettings {
                statistics: "統計.pdf".to_string(),
                statistics_sheet: None,
                order_workbook: None,
                order_sheet: default_order_sheet(),
                order_column: default_order_column(),
                skip_columns: 1,
            },
            locations: locations(),
        };
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Tsv.extension(), "tsv");
    }
}
