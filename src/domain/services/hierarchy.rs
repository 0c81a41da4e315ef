//! 按中古音層級整理各調查點的聲韻與轄字。

use crate::domain::model::Table;
use crate::domain::services::extractor::PhoneticMap;
use crate::domain::services::merge::MergeTable;
use crate::domain::services::ordering::sort_classes;
use std::collections::{HashMap, HashSet};

/// 低於此比例的主類不單獨成行
pub const DEFAULT_SMALL_CLASS_RATIO: f64 = 0.07;

/// 層級表中的一個字及其以 "-" 切分的層級
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub character: String,
    pub levels: Vec<String>,
}

/// 依完整層級路徑首次出現的順序排列，同一路徑的字保持表中順序
pub fn build_entries<'a, I>(rows: I) -> (Vec<HierarchyEntry>, usize)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut paths: Vec<Vec<String>> = Vec::new();
    let mut by_path: HashMap<Vec<String>, Vec<String>> = HashMap::new();

    for (character, category) in rows {
        let (character, category) = (character.trim(), category.trim());
        if character.is_empty() || category.is_empty() {
            continue;
        }
        let levels: Vec<String> = category.split('-').map(String::from).collect();
        if !by_path.contains_key(&levels) {
            paths.push(levels.clone());
        }
        by_path.entry(levels).or_default().push(character.to_string());
    }

    let max_level = paths.iter().map(Vec::len).max().unwrap_or(0);
    let entries = paths
        .into_iter()
        .flat_map(|levels| {
            let characters = by_path.remove(&levels).unwrap_or_default();
            characters.into_iter().map(move |character| HierarchyEntry {
                character,
                levels: levels.clone(),
            })
        })
        .collect();
    (entries, max_level)
}

/// 輸出的一欄調查點；Placeholder 對應分區之間的 "_"
#[derive(Debug, Clone)]
pub enum SurveyColumn {
    Placeholder,
    Location { name: String, phonetics: PhoneticMap },
}

impl SurveyColumn {
    fn location(&self) -> Option<(&str, &PhoneticMap)> {
        match self {
            SurveyColumn::Placeholder => None,
            SurveyColumn::Location { name, phonetics } => Some((name.as_str(), phonetics)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArrangeOptions {
    pub category: String,
    pub small_class_ratio: f64,
    pub merge: MergeTable,
}

impl ArrangeOptions {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            small_class_ratio: DEFAULT_SMALL_CLASS_RATIO,
            merge: MergeTable::default(),
        }
    }
}

/// 一個分組在某調查點的統計
#[derive(Debug, Default)]
struct LocationClasses {
    total: usize,
    /// 子類 -> 字（每個讀音一次）
    classes: HashMap<String, Vec<String>>,
}

fn dedup_preserving_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn header(level: usize, columns: &[SurveyColumn]) -> Vec<String> {
    let mut header: Vec<String> = (1..=level).map(|i| format!("level{}", i)).collect();
    for column in columns {
        match column.location() {
            Some((name, _)) => {
                header.push(format!("{}_聲韻", name));
                header.push(format!("{}_轄字", name));
            }
            None => header.extend([String::new(), String::new()]),
        }
    }
    header
}

/// 多音字在轄字格中加批註：「字：讀音1, 讀音2」
fn annotate_polyphones(
    table: &mut Table,
    row: usize,
    column: usize,
    characters: &[String],
    phonetics: &PhoneticMap,
) {
    for character in characters {
        let Some(readings) = phonetics.get(character) else {
            continue;
        };
        if readings.len() > 1 {
            let joined = readings
                .iter()
                .map(|(_, transcription)| transcription.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            table.annotate(row, column, format!("{}：{}", character, joined));
        }
    }
}

fn arrange_group(
    table: &mut Table,
    key: &[String],
    characters: &[String],
    columns: &[SurveyColumn],
    options: &ArrangeOptions,
) {
    if columns.is_empty() {
        let mut row = key.to_vec();
        row.extend([String::new(), String::new()]);
        table.push_row(row);
        return;
    }

    // 各調查點的子類統計，以及 主類 -> 子類（首次出現順序）
    let mut per_location: HashMap<&str, LocationClasses> = HashMap::new();
    let mut sub_classes: HashMap<String, Vec<String>> = HashMap::new();
    let mut main_classes: Vec<String> = Vec::new();

    for (name, phonetics) in columns.iter().filter_map(SurveyColumn::location) {
        let stats = per_location.entry(name).or_default();
        stats.total = characters.iter().filter(|c| phonetics.contains_key(*c)).count();
        for character in characters {
            for (value, _) in phonetics.get(character).into_iter().flatten() {
                let main = options.merge.main_class(value).to_string();
                stats
                    .classes
                    .entry(value.clone())
                    .or_default()
                    .push(character.clone());
                let subs = sub_classes.entry(main.clone()).or_insert_with(|| {
                    main_classes.push(main.clone());
                    Vec::new()
                });
                if !subs.contains(value) {
                    subs.push(value.clone());
                }
            }
        }
    }
    sort_classes(&mut main_classes);

    // (主類, 調查點 -> 轄字)
    let mut small_classes: Vec<(String, HashMap<&str, Vec<String>>)> = Vec::new();
    let base = key.len();

    for main in &main_classes {
        let mut merged_by_location: HashMap<&str, Vec<String>> = HashMap::new();
        let mut small_locations: HashSet<&str> = HashSet::new();

        for (name, _) in columns.iter().filter_map(SurveyColumn::location) {
            let stats = &per_location[name];
            let present: Vec<&String> = sub_classes[main]
                .iter()
                .filter(|sub| stats.classes.contains_key(*sub))
                .collect();
            if present.is_empty() {
                continue;
            }
            let merged = dedup_preserving_order(
                present
                    .into_iter()
                    .flat_map(|sub| stats.classes[sub].iter().cloned()),
            );
            let proportion = merged.len() as f64 / stats.total.max(1) as f64;
            if proportion < options.small_class_ratio {
                small_locations.insert(name);
            }
            merged_by_location.insert(name, merged);
        }

        if !small_locations.is_empty() {
            let small: HashMap<&str, Vec<String>> = merged_by_location
                .iter()
                .filter(|(name, _)| small_locations.contains(*name))
                .map(|(name, chars)| (*name, chars.clone()))
                .collect();
            small_classes.push((main.clone(), small));
        }

        let mut cells = Vec::with_capacity(columns.len() * 2);
        for column in columns {
            match column.location() {
                Some((name, _)) if !small_locations.contains(name) => {
                    match merged_by_location.get(name) {
                        Some(chars) => cells.extend([main.clone(), chars.concat()]),
                        None => cells.extend([String::new(), String::new()]),
                    }
                }
                _ => cells.extend([String::new(), String::new()]),
            }
        }
        if cells.iter().all(String::is_empty) {
            continue;
        }

        let mut row = key.to_vec();
        row.extend(cells);
        let index = table.push_row(row);

        for (i, column) in columns.iter().enumerate() {
            let Some((name, phonetics)) = column.location() else {
                continue;
            };
            if small_locations.contains(name) {
                continue;
            }
            if let Some(chars) = merged_by_location.get(name) {
                annotate_polyphones(table, index, base + i * 2 + 1, chars, phonetics);
            }
        }
    }

    if small_classes.is_empty() {
        return;
    }

    // 小類合併成一行，聲韻與轄字各以換行分隔
    let mut row = key.to_vec();
    for column in columns {
        let Some((name, _)) = column.location() else {
            row.extend([String::new(), String::new()]);
            continue;
        };
        let (labels, chars): (Vec<&str>, Vec<String>) = small_classes
            .iter()
            .filter_map(|(main, by_location)| {
                by_location
                    .get(name)
                    .map(|chars| (main.as_str(), chars.concat()))
            })
            .unzip();
        row.push(labels.join("\n"));
        row.push(chars.join("\n"));
    }
    let index = table.push_row(row);

    for (i, column) in columns.iter().enumerate() {
        let Some((name, phonetics)) = column.location() else {
            continue;
        };
        for (_, by_location) in &small_classes {
            if let Some(chars) = by_location.get(name) {
                annotate_polyphones(table, index, base + i * 2 + 1, chars, phonetics);
            }
        }
    }
}

/// 每一級輸出一張表，名為 "{分類欄}_第{L}級"
pub fn arrange(
    entries: &[HierarchyEntry],
    max_level: usize,
    columns: &[SurveyColumn],
    options: &ArrangeOptions,
) -> Vec<Table> {
    let mut tables = Vec::with_capacity(max_level);

    for level in 1..=max_level {
        let mut table = Table::new(format!("{}_第{}級", options.category, level));
        table.push_row(header(level, columns));

        let mut keys: Vec<&[String]> = Vec::new();
        let mut groups: HashMap<&[String], Vec<String>> = HashMap::new();
        for entry in entries.iter().filter(|e| e.levels.len() >= level) {
            let key = &entry.levels[..level];
            groups
                .entry(key)
                .or_insert_with(|| {
                    keys.push(key);
                    Vec::new()
                })
                .push(entry.character.clone());
        }
        tracing::debug!("Level {}: {} groups", level, keys.len());

        for key in keys {
            arrange_group(&mut table, key, &groups[key], columns, options);
        }
        tables.push(table);
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phonetics(readings: &[(&str, &str, &str)]) -> PhoneticMap {
        let mut map = PhoneticMap::new();
        for (character, value, transcription) in readings {
            map.entry(character.to_string())
                .or_default()
                .push((value.to_string(), transcription.to_string()));
        }
        map
    }

    fn location(name: &str, readings: &[(&str, &str, &str)]) -> SurveyColumn {
        SurveyColumn::Location {
            name: name.to_string(),
            phonetics: phonetics(readings),
        }
    }

    fn entries() -> (Vec<HierarchyEntry>, usize) {
        build_entries(vec![
            ("東", "通-東"),
            ("冬", "通-冬"),
            ("同", "通-東"),
            ("江", "江"),
            ("", "通-東"),
            ("鍾", ""),
        ])
    }

    #[test]
    fn test_build_entries_groups_by_full_path() {
        let (entries, max_level) = entries();
        assert_eq!(max_level, 2);
        let chars: Vec<&str> = entries.iter().map(|e| e.character.as_str()).collect();
        assert_eq!(chars, vec!["東", "同", "冬", "江"]);
    }

    #[test]
    fn test_one_table_per_level_with_header() {
        let (entries, max_level) = entries();
        let columns = vec![location("廣州", &[("東", "uŋ", "tuŋ1")]), SurveyColumn::Placeholder];
        let tables = arrange(&entries, max_level, &columns, &ArrangeOptions::new("韻母簡"));
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "韻母簡_第1級");
        assert_eq!(tables[1].rows[0], vec!["level1", "level2", "廣州_聲韻", "廣州_轄字", "", ""]);
    }

    #[test]
    fn test_rows_merge_and_sort_classes() {
        let (entries, max_level) = entries();
        let columns = vec![location(
            "廣州",
            &[
                ("東", "uŋ", "tuŋ1"),
                ("同", "uŋ", "tʰuŋ2"),
                ("同", "oŋ", "tʰoŋ2"),
                ("冬", "uŋ", "tuŋ1"),
                ("江", "ɔŋ", "kɔŋ1"),
            ],
        )];
        let tables = arrange(&entries, max_level, &columns, &ArrangeOptions::new("韻母簡"));
        let level1 = &tables[0];
        // 通：oŋ 排在 uŋ 之前
        assert_eq!(level1.rows[1], vec!["通", "oŋ", "同"]);
        assert_eq!(level1.rows[2], vec!["通", "uŋ", "東同冬"]);
        assert_eq!(level1.rows[3], vec!["江", "ɔŋ", "江"]);
        assert_eq!(level1.note(1, 2), Some("同：tʰuŋ2, tʰoŋ2"));
        assert_eq!(level1.note(2, 2), Some("同：tʰuŋ2, tʰoŋ2"));

        // 第二級只有兩級路徑的字
        let level2 = &tables[1];
        assert_eq!(level2.rows.len(), 4);
        assert_eq!(level2.rows[3], vec!["通", "冬", "uŋ", "冬"]);
    }

    #[test]
    fn test_merge_table_combines_variants() {
        let (entries, _) = build_entries(vec![("五", "疑"), ("吳", "疑"), ("牙", "疑")]);
        let columns = vec![location(
            "廣州",
            &[("五", "ŋ", "ŋ4"), ("吳", "ng", "ng4"), ("牙", "∅", "a4")],
        )];
        let tables = arrange(&entries, 1, &columns, &ArrangeOptions::new("聲母"));
        assert_eq!(tables[0].rows[1], vec!["疑", "ŋ", "五吳"]);
        assert_eq!(tables[0].rows[2], vec!["疑", "ʔ", "牙"]);
    }

    #[test]
    fn test_small_classes_collected_in_catch_all_row() {
        let (entries, _) = build_entries(vec![("東", "通"), ("同", "通"), ("冬", "通"), ("龍", "通")]);
        let columns = vec![
            location(
                "廣州",
                &[("東", "uŋ", "tuŋ1"), ("同", "uŋ", "tʰuŋ2"), ("冬", "oŋ", "toŋ1"), ("龍", "ʊŋ", "lʊŋ2")],
            ),
            SurveyColumn::Placeholder,
            location("佛山", &[("東", "uŋ", "tuŋ1"), ("龍", "oŋ", "loŋ2"), ("龍", "uŋ", "luŋ2")]),
        ];
        let mut options = ArrangeOptions::new("韻母簡");
        options.small_class_ratio = 0.3;
        let table = &arrange(&entries, 1, &columns, &options)[0];

        // 廣州 oŋ 與 ʊŋ 各佔 1/4，低於 0.3
        assert_eq!(table.rows[1], vec!["通", "", "", "", "", "oŋ", "龍"]);
        assert_eq!(table.rows[2], vec!["通", "uŋ", "東同", "", "", "uŋ", "東龍"]);
        assert_eq!(table.rows[3], vec!["通", "oŋ\nʊŋ", "冬\n龍", "", "", "", ""]);
        assert_eq!(table.note(1, 6), Some("龍：loŋ2, luŋ2"));
        assert_eq!(table.rows.len(), 4);
    }

    #[test]
    fn test_no_surveys_writes_key_rows() {
        let (entries, max_level) = entries();
        let tables = arrange(&entries, max_level, &[], &ArrangeOptions::new("韻母簡"));
        assert_eq!(tables[0].rows[0], vec!["level1"]);
        assert_eq!(tables[0].rows[1], vec!["通", "", ""]);
        assert_eq!(tables[0].rows[2], vec!["江", "", ""]);
    }
}
