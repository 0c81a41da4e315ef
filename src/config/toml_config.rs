use crate::config::{
    ArrangeSettings, ExamplesSettings, ExtractSettings, FrequencySettings, Job, LocationSettings,
    OutputFormat, OutputSettings, DEFAULT_ARCHIVE_NAME,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_path, Validate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Extract,
    Examples,
    Arrange,
    Frequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub load: LoadConfig,
    pub locations: Option<LocationSettings>,
    pub extract: Option<ExtractSettings>,
    pub examples: Option<ExamplesSettings>,
    pub arrange: Option<ArrangeSettings>,
    pub frequency: Option<FrequencySettings>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub kind: JobKind,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<LogFormat>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    fn locations(&self) -> Result<LocationSettings> {
        self.locations
            .clone()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "locations".to_string(),
            })
    }

    fn section<T: Clone>(section: &Option<T>, name: &str) -> Result<T> {
        section.clone().ok_or_else(|| EtlError::MissingConfigError {
            field: name.to_string(),
        })
    }

    /// 依 job.kind 取出對應的設定段
    pub fn to_job(&self) -> Result<Job> {
        let job = match self.job.kind {
            JobKind::Extract => Job::Extract(Self::section(&self.extract, "extract")?),
            JobKind::Examples => Job::Examples(Self::section(&self.examples, "examples")?),
            JobKind::Arrange => Job::Arrange {
                settings: Self::section(&self.arrange, "arrange")?,
                locations: self.locations()?,
            },
            JobKind::Frequency => Job::Frequency {
                settings: Self::section(&self.frequency, "frequency")?,
                locations: self.locations()?,
            },
        };
        Ok(job)
    }

    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            output_path: self.load.output_path.clone(),
            formats: self.load.output_formats.clone(),
            compress: self.compress(),
            archive_name: self.archive_name().to_string(),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> LogFormat {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.load.output_formats
    }

    fn compress(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    fn archive_name(&self) -> &str {
        self.load
            .compression
            .as_ref()
            .and_then(|c| c.filename.as_deref())
            .unwrap_or(DEFAULT_ARCHIVE_NAME)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("load.output_path", &self.load.output_path)?;
        self.output_settings().validate()?;
        self.to_job()?.validate()
    }
}
