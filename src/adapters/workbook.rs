use crate::adapters::survey::strip_bom;
use crate::domain::model::Sheet;
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;

pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const TABLE_EXTENSIONS: &[&str] = &["csv", "tsv"];

fn extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// 整數值的浮點儲存格寫回整數形式，避免 "1" 讀成 "1.0"
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

fn split_header(name: &str, mut rows: Vec<Vec<String>>) -> Sheet {
    if rows.is_empty() {
        return Sheet::new(name, Vec::new(), Vec::new());
    }
    let headers = rows.remove(0);
    Sheet::new(name, headers, rows)
}

/// 以 calamine 讀取工作表；未指定名稱時取第一張
fn read_workbook_sheet(path: &str, data: Vec<u8>, sheet: Option<&str>) -> Result<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))?;
    let names = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| EtlError::MissingSheetError {
                file: path.to_string(),
                sheet: wanted.to_string(),
            })?,
        None => names.first().cloned().ok_or_else(|| EtlError::MissingSheetError {
            file: path.to_string(),
            sheet: "(first sheet)".to_string(),
        })?,
    };

    let range = workbook.worksheet_range(&name)?;
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    tracing::debug!("Read sheet '{}' from {} ({} rows)", name, path, rows.len());
    Ok(split_header(&name, rows))
}

fn read_delimited(name: &str, data: &[u8], delimiter: u8) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(strip_bom(data));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| field.trim().to_string()).collect());
    }
    Ok(split_header(name, rows))
}

/// 依副檔名讀入一張表：工作簿取指定工作表，CSV/TSV 整個檔案即一張表
pub fn parse_sheet(path: &str, data: Vec<u8>, sheet: Option<&str>) -> Result<Sheet> {
    let ext = extension(path);
    let fallback_name = sheet
        .map(String::from)
        .unwrap_or_else(|| crate::adapters::survey::survey_name(path));

    match ext.as_str() {
        "csv" => read_delimited(&fallback_name, &data, b','),
        "tsv" | "txt" => read_delimited(&fallback_name, &data, b'\t'),
        e if WORKBOOK_EXTENSIONS.contains(&e) => read_workbook_sheet(path, data, sheet),
        _ => Err(EtlError::InvalidConfigValueError {
            field: "input".to_string(),
            value: path.to_string(),
            reason: format!(
                "Unsupported table format. Use one of: {}, {}",
                WORKBOOK_EXTENSIONS.join(", "),
                TABLE_EXTENSIONS.join(", ")
            ),
        }),
    }
}

pub async fn load_sheet<S: Storage>(storage: &S, path: &str, sheet: Option<&str>) -> Result<Sheet> {
    let data = storage.read_file(path).await?;
    parse_sheet(path, data, sheet)
}

/// 讀取某欄並要求該欄存在
pub fn require_column(sheet: &Sheet, file: &str, column: &str) -> Result<usize> {
    sheet
        .column_index(column)
        .ok_or_else(|| EtlError::MissingColumnError {
            file: file.to_string(),
            column: column.to_string(),
        })
}
