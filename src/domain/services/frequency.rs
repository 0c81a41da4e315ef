//! 各地聲韻頻率統計。

use crate::domain::model::{Sheet, Table};
use crate::domain::services::location::LocationSlot;
use std::collections::{BTreeSet, HashMap, HashSet};

pub const VALUE_SUFFIX: &str = "聲韻";
pub const CHARACTERS_SUFFIX: &str = "轄字";
pub const TABLE_NAME: &str = "聲韻頻率";
pub const TOTAL_HEADER: &str = "總頻率";

/// 跳過前 skip 欄後，每隔一欄取以「聲韻」結尾的表頭作地點名
pub fn location_names(sheet: &Sheet, skip_columns: usize) -> Vec<String> {
    sheet
        .headers
        .iter()
        .skip(skip_columns)
        .step_by(2)
        .map(|header| header.trim())
        .filter(|header| header.ends_with(VALUE_SUFFIX))
        .map(|header| {
            header
                .rsplit_once('_')
                .map(|(name, _)| name)
                .unwrap_or(header)
                .to_string()
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
struct LocationCounts {
    total: usize,
    counts: HashMap<String, usize>,
    characters: HashMap<String, String>,
}

/// count / total × 100，四捨五入到一位小數
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn format_percent(value: f64) -> String {
    if value > 0.0 {
        format!("{:.1}%", value)
    } else {
        String::new()
    }
}

#[derive(Debug, Clone)]
pub struct FrequencyReport {
    pub slots: Vec<LocationSlot>,
    pub values: Vec<String>,
    per_location: HashMap<String, LocationCounts>,
    overall: HashMap<String, usize>,
    overall_total: usize,
}

impl FrequencyReport {
    pub fn location_count(&self) -> usize {
        self.per_location.len()
    }

    pub fn overall_total(&self) -> usize {
        self.overall_total
    }

    pub fn percent_at(&self, location: &str, value: &str) -> f64 {
        self.per_location
            .get(location)
            .map(|c| percent(c.counts.get(value).copied().unwrap_or(0), c.total))
            .unwrap_or(0.0)
    }

    pub fn overall_percent(&self, value: &str) -> f64 {
        percent(self.overall.get(value).copied().unwrap_or(0), self.overall_total)
    }

    /// 第一行分區，第二行表頭，之後每個聲韻一行；批註列出轄字
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(TABLE_NAME);

        let mut partition_row = vec!["分區".to_string()];
        partition_row.extend(self.slots.iter().map(|s| s.partition.clone()));
        partition_row.push(String::new());
        table.push_row(partition_row);

        let mut header = vec![VALUE_SUFFIX.to_string()];
        header.extend(self.slots.iter().map(|s| s.name.clone()));
        header.push(TOTAL_HEADER.to_string());
        table.push_row(header);

        for value in &self.values {
            let mut row = vec![value.clone()];
            row.extend(self.slots.iter().map(|slot| {
                if slot.is_separator() {
                    String::new()
                } else {
                    format_percent(self.percent_at(&slot.name, value))
                }
            }));
            row.push(format_percent(self.overall_percent(value)));
            let index = table.push_row(row);

            for (i, slot) in self.slots.iter().enumerate() {
                if slot.is_separator() {
                    continue;
                }
                if let Some(chars) = self
                    .per_location
                    .get(&slot.name)
                    .and_then(|c| c.characters.get(value))
                {
                    table.annotate(index, i + 1, chars);
                }
            }
        }
        table
    }
}

/// 統計每個地點各聲韻的轄字數；order 中的聲韻排在前面，其餘按字串排序
pub fn compute(sheet: &Sheet, slots: Vec<LocationSlot>, order: &[String]) -> FrequencyReport {
    let mut per_location: HashMap<String, LocationCounts> = HashMap::new();
    let mut overall: HashMap<String, usize> = HashMap::new();
    let mut overall_total = 0usize;

    for slot in slots.iter().filter(|s| !s.is_separator()) {
        let value_column = sheet.column_index(&format!("{}_{}", slot.name, VALUE_SUFFIX));
        let chars_column = sheet.column_index(&format!("{}_{}", slot.name, CHARACTERS_SUFFIX));
        let (Some(value_column), Some(chars_column)) = (value_column, chars_column) else {
            tracing::warn!("⚠️ Missing 聲韻/轄字 columns for location '{}'", slot.name);
            continue;
        };

        let counts = per_location.entry(slot.name.clone()).or_default();
        for row in 0..sheet.rows.len() {
            let value = sheet.value(row, value_column);
            let chars = sheet.value(row, chars_column);
            if value.is_empty() || chars.is_empty() {
                continue;
            }
            let chars: String = chars.chars().filter(|c| !c.is_whitespace()).collect();
            let count = chars.chars().count();

            counts.total += count;
            *counts.counts.entry(value.to_string()).or_default() += count;
            counts
                .characters
                .entry(value.to_string())
                .or_default()
                .push_str(&chars);
            *overall.entry(value.to_string()).or_default() += count;
            overall_total += count;
        }
    }

    let present: BTreeSet<&str> = per_location
        .values()
        .flat_map(|c| c.counts.keys().map(String::as_str))
        .collect();
    let mut seen = HashSet::new();
    let mut values: Vec<String> = order
        .iter()
        .filter(|v| present.contains(v.as_str()) && seen.insert(v.as_str()))
        .cloned()
        .collect();
    values.extend(
        present
            .iter()
            .filter(|v| !seen.contains(*v))
            .map(|v| v.to_string()),
    );

    tracing::debug!(
        "Frequency: {} locations, {} values, {} characters",
        per_location.len(),
        values.len(),
        overall_total
    );

    FrequencyReport {
        slots,
        values,
        per_location,
        overall,
        overall_total,
    }
}
