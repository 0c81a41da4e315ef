use crate::config::OutputFormat;
use crate::domain::model::{CellNote, Table, TransformResult};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const SUMMARY_FILE: &str = "summary.json";

/// 一個待寫出的檔案
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub data: Vec<u8>,
}

fn file_stem(table: &Table) -> String {
    table
        .name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

fn render_delimited(rows: &[Vec<String>], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush table: {}", e),
    })
}

#[derive(Serialize)]
struct JsonTable<'a> {
    name: &'a str,
    rows: &'a [Vec<String>],
}

pub fn render_table(table: &Table, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => render_delimited(&table.rows, b','),
        OutputFormat::Tsv => render_delimited(&table.rows, b'\t'),
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(&JsonTable {
            name: &table.name,
            rows: &table.rows,
        })?),
    }
}

/// 批註表：儲存格 (A1) / 行 / 欄 / 內容
pub fn render_notes(notes: &[CellNote], format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(notes)?),
        OutputFormat::Csv | OutputFormat::Tsv => {
            let mut rows = vec![vec![
                "cell".to_string(),
                "row".to_string(),
                "column".to_string(),
                "note".to_string(),
            ]];
            rows.extend(notes.iter().map(|note| {
                vec![
                    note.cell.clone(),
                    (note.row + 1).to_string(),
                    (note.column + 1).to_string(),
                    note.text.clone(),
                ]
            }));
            let delimiter = if format == OutputFormat::Tsv { b'\t' } else { b',' };
            render_delimited(&rows, delimiter)
        }
    }
}

/// 每張表按設定的每種格式輸出，有批註時另出 {表名}_notes.{格式}，最後附 summary.json
pub fn render_outputs(
    job: &str,
    result: &TransformResult,
    formats: &[OutputFormat],
) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();

    for table in &result.tables {
        let stem = file_stem(table);
        let notes = table.cell_notes();
        for format in formats {
            files.push(OutputFile {
                name: format!("{}.{}", stem, format.extension()),
                data: render_table(table, *format)?,
            });
            if !notes.is_empty() {
                files.push(OutputFile {
                    name: format!("{}_notes.{}", stem, format.extension()),
                    data: render_notes(&notes, *format)?,
                });
            }
        }
    }

    let tables: Vec<serde_json::Value> = result
        .tables
        .iter()
        .map(|table| {
            serde_json::json!({
                "name": table.name,
                "rows": table.rows.len(),
                "notes": table.cell_notes().len(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "job": job,
        "generated_at": chrono::Local::now().to_rfc3339(),
        "tables": tables,
        "details": result.summary,
    });
    files.push(OutputFile {
        name: SUMMARY_FILE.to_string(),
        data: serde_json::to_vec_pretty(&summary)?,
    });

    Ok(files)
}

fn zip_files(files: &[OutputFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// 寫出全部檔案，回傳輸出位置（目錄或壓縮檔路徑）
pub async fn write_outputs<S: Storage, C: ConfigProvider>(
    storage: &S,
    config: &C,
    job: &str,
    result: &TransformResult,
) -> Result<String> {
    let files = render_outputs(job, result, config.output_formats())?;

    if config.compress() {
        let archive = zip_files(&files)?;
        tracing::debug!(
            "Writing {} files into {} ({} bytes)",
            files.len(),
            config.archive_name(),
            archive.len()
        );
        storage.write_file(config.archive_name(), &archive).await?;
        return Ok(format!("{}/{}", config.output_path(), config.archive_name()));
    }

    for file in &files {
        storage.write_file(&file.name, &file.data).await?;
    }
    tracing::debug!("Wrote {} files to {}", files.len(), config.output_path());
    Ok(config.output_path().to_string())
}
