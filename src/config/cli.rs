use crate::adapters::script::ScriptSettings;
use crate::config::{
    ArrangeSettings, ExamplesSettings, ExtractSettings, FrequencySettings, Job, LocationSettings,
    OutputFormat, OutputSettings, DEFAULT_ARCHIVE_NAME, DEFAULT_OUTPUT_PATH,
};
use crate::domain::model::Feature;
use crate::domain::ports::ConfigProvider;
use crate::domain::services::hierarchy::DEFAULT_SMALL_CLASS_RATIO;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Parser)]
#[command(name = "shengyun")]
#[command(about = "Extract, arrange and count initials, rhymes and tones from dialect survey tables")]
pub struct CliConfig {
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, global = true, value_enum, value_delimiter = ',', default_value = "csv")]
    pub format: Vec<OutputFormat>,

    #[arg(long, global = true, help = "Bundle all outputs into one zip archive")]
    pub compress: bool,

    #[arg(long, global = true, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log memory and timing per phase")]
    pub monitor: bool,

    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 逐字抽取聲母、韻母或聲調
    Extract {
        #[arg(required = true)]
        surveys: Vec<String>,
        #[arg(long, value_enum, default_value = "vowel")]
        feature: Feature,
        /// 要查的字，留空代表全部
        #[arg(long, default_value = "")]
        chars: String,
    },
    /// 按例字表歸納各點的聲母或韻母
    Examples {
        #[arg(required = true)]
        surveys: Vec<String>,
        #[arg(long)]
        workbook: String,
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long, default_value = "例字")]
        column: String,
        #[arg(long, value_enum, default_value = "vowel")]
        feature: Feature,
    },
    /// 按層級表整理各點的聲韻與轄字
    Arrange {
        #[arg(required = true)]
        surveys: Vec<String>,
        #[arg(long)]
        workbook: String,
        #[arg(long, default_value = "層級")]
        sheet: String,
        #[arg(long, default_value = "單字")]
        character_column: String,
        #[arg(long, default_value = "韻母簡")]
        category: String,
        #[arg(long, value_enum, default_value = "vowel")]
        feature: Feature,
        #[arg(long, default_value_t = DEFAULT_SMALL_CLASS_RATIO)]
        small_class_ratio: f64,
        #[command(flatten)]
        locations: LocationArgs,
    },
    /// 統計各點聲韻頻率
    Frequency {
        statistics: String,
        #[arg(long)]
        statistics_sheet: Option<String>,
        #[arg(long)]
        order_workbook: Option<String>,
        #[arg(long, default_value = "順序")]
        order_sheet: String,
        #[arg(long, default_value = "送氣")]
        order_column: String,
        #[arg(long, default_value_t = 1)]
        skip_columns: usize,
        #[command(flatten)]
        locations: LocationArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// 簡稱表（簡稱 / 音典分區 / 是否有人在做）
    #[arg(long)]
    pub abbreviations: String,
    #[arg(long)]
    pub allow_duplicate_abbreviations: bool,
    #[arg(long, default_value = "全部")]
    pub partitions: String,
    /// OpenCC 簡轉繁詞典，可重複
    #[arg(long)]
    pub s2t: Vec<String>,
    #[arg(long)]
    pub t2s: Vec<String>,
    #[arg(long)]
    pub variants: Vec<String>,
}

impl From<LocationArgs> for LocationSettings {
    fn from(args: LocationArgs) -> Self {
        LocationSettings {
            abbreviations: args.abbreviations,
            allow_duplicate_abbreviations: args.allow_duplicate_abbreviations,
            partitions: args.partitions,
            script: ScriptSettings {
                s2t: args.s2t,
                t2s: args.t2s,
                variants: args.variants,
                custom_variants: BTreeMap::new(),
            },
        }
    }
}

impl CliConfig {
    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            output_path: self.output_path.clone(),
            formats: self.format.clone(),
            compress: self.compress,
            archive_name: self.archive_name.clone(),
        }
    }

    pub fn job(&self) -> Job {
        match self.command.clone() {
            Command::Extract {
                surveys,
                feature,
                chars,
            } => Job::Extract(ExtractSettings {
                surveys,
                feature,
                characters: chars,
            }),
            Command::Examples {
                surveys,
                workbook,
                sheet,
                column,
                feature,
            } => Job::Examples(ExamplesSettings {
                surveys,
                workbook,
                sheet,
                column,
                feature,
            }),
            Command::Arrange {
                surveys,
                workbook,
                sheet,
                character_column,
                category,
                feature,
                small_class_ratio,
                locations,
            } => Job::Arrange {
                settings: ArrangeSettings {
                    surveys,
                    workbook,
                    sheet,
                    character_column,
                    category_column: category,
                    feature,
                    small_class_ratio,
                    merge_groups: BTreeMap::new(),
                },
                locations: locations.into(),
            },
            Command::Frequency {
                statistics,
                statistics_sheet,
                order_workbook,
                order_sheet,
                order_column,
                skip_columns,
                locations,
            } => Job::Frequency {
                settings: FrequencySettings {
                    statistics,
                    statistics_sheet,
                    order_workbook,
                    order_sheet,
                    order_column,
                    skip_columns,
                },
                locations: locations.into(),
            },
        }
    }
}

impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.format
    }

    fn compress(&self) -> bool {
        self.compress
    }

    fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.output_settings().validate()?;
        self.job().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_command() {
        let config = CliConfig::parse_from([
            "shengyun",
            "extract",
            "廣州.tsv",
            "佛山.tsv",
            "--feature",
            "tone",
            "--chars",
            "東西",
            "--format",
            "csv,json",
        ]);
        assert_eq!(config.format, vec![OutputFormat::Csv, OutputFormat::Json]);
        match config.job() {
            Job::Extract(settings) => {
                assert_eq!(settings.surveys.len(), 2);
                assert_eq!(settings.feature, Feature::Tone);
                assert_eq!(settings.characters, "東西");
            }
            other => panic!("unexpected job: {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_arrange_with_locations() {
        let config = CliConfig::parse_from([
            "shengyun",
            "--compress",
            "arrange",
            "廣州.tsv",
            "--workbook",
            "聲韻.xlsx",
            "--abbreviations",
            "簡稱.csv",
            "--partitions",
            "嶺南 嶺西",
            "--s2t",
            "STCharacters.txt",
        ]);
        assert!(config.compress());
        match config.job() {
            Job::Arrange {
                settings,
                locations,
            } => {
                assert_eq!(settings.category_column, "韻母簡");
                assert_eq!(settings.small_class_ratio, DEFAULT_SMALL_CLASS_RATIO);
                assert_eq!(locations.partitions, "嶺南 嶺西");
                assert_eq!(locations.script.s2t, vec!["STCharacters.txt"]);
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }

    #[test]
    fn test_frequency_defaults() {
        let config = CliConfig::parse_from([
            "shengyun",
            "frequency",
            "統計.xlsx",
            "--abbreviations",
            "簡稱.csv",
        ]);
        match config.job() {
            Job::Frequency { settings, .. } => {
                assert_eq!(settings.skip_columns, 1);
                assert_eq!(settings.order_column, "送氣");
                assert!(settings.order_workbook.is_none());
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_survey_extension_rejected() {
        let config = CliConfig::parse_from(["shengyun", "extract", "廣州.xlsx"]);
        assert!(config.validate().is_err());
    }
}
