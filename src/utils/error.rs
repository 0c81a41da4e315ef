use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{file}: missing column '{column}'")]
    MissingColumnError { file: String, column: String },

    #[error("{file}: missing sheet '{sheet}'")]
    MissingSheetError { file: String, sheet: String },

    #[error("Duplicate abbreviations still in use: {}", .names.join(", "))]
    DuplicateAbbreviationError { names: Vec<String> },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::IoError(_) | EtlError::ZipError(_) => ErrorCategory::Io,
            EtlError::CsvError(_)
            | EtlError::WorkbookError(_)
            | EtlError::MissingColumnError { .. }
            | EtlError::MissingSheetError { .. }
            | EtlError::DuplicateAbbreviationError { .. } => ErrorCategory::Input,
            EtlError::ConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::MissingColumnError { column, .. } => {
                format!("確認檔案表頭包含 '{}' 列", column)
            }
            EtlError::MissingSheetError { sheet, .. } => {
                format!("確認工作簿包含名為 '{}' 的工作表", sheet)
            }
            EtlError::DuplicateAbbreviationError { .. } => {
                "處理簡稱重複問題，或以 --allow-duplicate-abbreviations 繼續".to_string()
            }
            EtlError::WorkbookError(_) | EtlError::CsvError(_) => {
                "檢查輸入表格是否損壞或格式不符".to_string()
            }
            _ => match self.category() {
                ErrorCategory::Configuration => "檢查命令列參數或 TOML 配置".to_string(),
                ErrorCategory::Io => "檢查檔案路徑與讀寫權限".to_string(),
                _ => "以 --verbose 重新執行以取得更多資訊".to_string(),
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("檔案讀寫失敗: {}", self),
            ErrorCategory::Input => format!("輸入資料有誤: {}", self),
            ErrorCategory::Configuration => format!("配置錯誤: {}", self),
            ErrorCategory::Processing => format!("處理失敗: {}", self),
        }
    }

    /// 依嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}
