use crate::domain::model::{Survey, SurveyRow};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::path::Path;

pub const CHARACTER_COLUMN: &str = "#漢字";
pub const TRANSCRIPTION_COLUMN: &str = "音標";

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// 調查點名稱取檔名（不含副檔名）
pub fn survey_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string()
}

pub(crate) fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(BOM).unwrap_or(data)
}

/// 解析 TSV 字表；漢字欄為空的行略過，音標可為空
pub fn parse_survey(name: &str, data: &[u8]) -> Result<Survey> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .has_headers(true)
        .from_reader(strip_bom(data));

    let headers = reader.headers()?.clone();
    let position = |column: &str| {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| EtlError::MissingColumnError {
                file: name.to_string(),
                column: column.to_string(),
            })
    };
    let character_index = position(CHARACTER_COLUMN)?;
    let transcription_index = position(TRANSCRIPTION_COLUMN)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let character = record.get(character_index).unwrap_or("").trim();
        if character.is_empty() {
            continue;
        }
        rows.push(SurveyRow {
            character: character.to_string(),
            transcription: record.get(transcription_index).unwrap_or("").trim().to_string(),
        });
    }

    tracing::debug!("Parsed survey {} with {} rows", name, rows.len());
    Ok(Survey::new(name, rows))
}

pub async fn load_survey<S: Storage>(storage: &S, path: &str) -> Result<Survey> {
    let data = storage.read_file(path).await?;
    parse_survey(&survey_name(path), &data)
}

/// 逐一載入，失敗的檔案記錄後略過
pub async fn load_surveys<S: Storage>(storage: &S, paths: &[String]) -> Vec<Survey> {
    let mut surveys = Vec::with_capacity(paths.len());
    for path in paths {
        match load_survey(storage, path).await {
            Ok(survey) => {
                tracing::info!("📄 Loaded {} ({} readings)", survey.name, survey.len());
                surveys.push(survey);
            }
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}: {}", path, e);
            }
        }
    }
    surveys
}
