use crate::adapters::workbook::{load_sheet, require_column};
use crate::domain::model::Sheet;
use crate::domain::ports::Storage;
use crate::domain::services::location::{AbbreviationRow, AbbreviationTable};
use crate::utils::error::Result;

pub const ABBREVIATION_COLUMN: &str = "簡稱";
pub const REGION_COLUMN: &str = "音典分區";
pub const IN_PROGRESS_COLUMN: &str = "是否有人在做";

/// 簡稱與分區欄必須存在，「是否有人在做」可缺
pub fn abbreviation_rows(sheet: &Sheet, file: &str) -> Result<Vec<AbbreviationRow>> {
    let abbreviation = require_column(sheet, file, ABBREVIATION_COLUMN)?;
    let region = require_column(sheet, file, REGION_COLUMN)?;
    let in_progress = sheet.column_index(IN_PROGRESS_COLUMN);

    let cell = |row: usize, column: usize| {
        let value = sheet.value(row, column);
        (!value.is_empty()).then(|| value.to_string())
    };

    Ok((0..sheet.rows.len())
        .map(|row| AbbreviationRow {
            abbreviation: cell(row, abbreviation),
            region: cell(row, region),
            in_progress: in_progress.and_then(|column| cell(row, column)),
        })
        .collect())
}

pub async fn load_abbreviations<S: Storage>(
    storage: &S,
    path: &str,
    allow_duplicates: bool,
) -> Result<AbbreviationTable> {
    let sheet = load_sheet(storage, path, None).await?;
    let rows = abbreviation_rows(&sheet, path)?;
    let table = AbbreviationTable::from_rows(rows, allow_duplicates)?;
    tracing::info!("📇 Loaded {} abbreviations from {}", table.len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::mock::MockStorage;
    use crate::utils::error::EtlError;

    const TABLE: &str = "簡稱,音典分區,是否有人在做,備註\n廣州,嶺南-廣府,是,\n佛山,嶺南-廣府,,\n,嶺西,,\n梧州,嶺西,否,\n";

    #[tokio::test]
    async fn test_load_abbreviation_table() {
        let storage = MockStorage::new();
        storage.put("簡稱.csv", TABLE).await;

        let table = load_abbreviations(&storage, "簡稱.csv", false).await.unwrap();
        assert_eq!(table.abbreviations().collect::<Vec<_>>(), vec!["廣州", "佛山", "梧州"]);
        assert_eq!(table.partition_of("佛山"), Some("嶺南"));
    }

    #[tokio::test]
    async fn test_duplicates_surface_as_error() {
        let storage = MockStorage::new();
        storage
            .put("簡稱.csv", "簡稱,音典分區\n廣州,嶺南\n廣州,嶺南\n")
            .await;
        let err = load_abbreviations(&storage, "簡稱.csv", false).await.unwrap_err();
        assert!(matches!(err, EtlError::DuplicateAbbreviationError { .. }));
    }

    #[test]
    fn test_missing_region_column() {
        let sheet = Sheet::new("t", vec!["簡稱".to_string()], vec![vec!["廣州".to_string()]]);
        let err = abbreviation_rows(&sheet, "t.csv").unwrap_err();
        assert!(matches!(err, EtlError::MissingColumnError { ref column, .. } if column == REGION_COLUMN));
    }
}
