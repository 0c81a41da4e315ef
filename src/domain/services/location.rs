//! 地點名與簡稱表的比對、排序與分區篩選。

use crate::domain::services::script::ScriptConverter;
use crate::utils::error::{EtlError, Result};
use std::collections::{HashMap, HashSet};

/// 分區之間的分隔欄
pub const PARTITION_SEPARATOR: &str = "_";
/// 已匹配與未匹配地點之間的分隔欄
pub const UNMATCHED_SEPARATOR: &str = "__";
/// 分區篩選中代表全部分區的字
pub const ALL_PARTITIONS: &str = "全部";

/// 內建的異體字對照，可由設定擴充
pub const CUSTOM_VARIANTS: &[(&str, &str)] = &[
    ("淸", "清"),
    ("鄕", "鄉"),
    ("鐵", "鉄"),
    ("髙", "高"),
    ("郞", "郎"),
    ("屛", "屏"),
    ("靑", "青"),
    ("尙", "尚"),
    ("郉", "邢"),
    ("楡", "榆"),
    ("峯", "峰"),
];

/// 簡稱表中的原始一行（欄位 簡稱 / 音典分區 / 是否有人在做）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationRow {
    pub abbreviation: Option<String>,
    pub region: Option<String>,
    pub in_progress: Option<String>,
}

impl AbbreviationRow {
    fn abandoned(&self) -> bool {
        self.in_progress.as_deref().map(str::trim) == Some("否")
    }
}

/// 清理後的簡稱表：保持原表順序，每個簡稱對應一個分區（音典分區 "-" 前的部分）
#[derive(Debug, Clone, Default)]
pub struct AbbreviationTable {
    entries: Vec<(String, String)>,
    partitions: HashMap<String, String>,
}

impl AbbreviationTable {
    /// 重複的簡稱：全部標為「否」時直接捨棄；
    /// 否則除非允許重複，回傳 DuplicateAbbreviationError。兩種情況都移除標為「否」的重複行
    pub fn from_rows(rows: Vec<AbbreviationRow>, allow_duplicates: bool) -> Result<Self> {
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            if let Some(abbreviation) = row.abbreviation.as_deref() {
                *occurrences.entry(abbreviation).or_default() += 1;
            }
        }
        let duplicated: HashSet<String> = occurrences
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect();

        if !duplicated.is_empty() {
            let mut seen = HashSet::new();
            let in_use: Vec<String> = rows
                .iter()
                .filter(|row| !row.abandoned())
                .filter_map(|row| row.abbreviation.clone())
                .filter(|name| duplicated.contains(name) && seen.insert(name.clone()))
                .collect();

            if in_use.is_empty() {
                tracing::info!("All duplicated abbreviations are marked 否, ignoring them");
            } else if !allow_duplicates {
                return Err(EtlError::DuplicateAbbreviationError { names: in_use });
            } else {
                tracing::warn!("⚠️ Duplicated abbreviations still in use: {}", in_use.join(", "));
            }
        }

        let mut table = Self::default();
        for row in rows {
            let is_dropped_duplicate = row.abandoned()
                && row
                    .abbreviation
                    .as_ref()
                    .is_some_and(|name| duplicated.contains(name));
            if is_dropped_duplicate {
                continue;
            }
            let (Some(abbreviation), Some(region)) = (row.abbreviation, row.region) else {
                continue;
            };
            let (abbreviation, region) = (abbreviation.trim(), region.trim());
            if abbreviation.is_empty() || region.is_empty() {
                continue;
            }
            let partition = region.split('-').next().unwrap_or(region).to_string();
            table
                .partitions
                .entry(abbreviation.to_string())
                .or_insert_with(|| partition.clone());
            table.entries.push((abbreviation.to_string(), partition));
        }

        tracing::debug!("Loaded {} abbreviations", table.entries.len());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn abbreviations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn partition_of(&self, abbreviation: &str) -> Option<&str> {
        self.partitions.get(abbreviation).map(String::as_str)
    }
}

/// 比對用的字形轉換器；未設定的轉換器對應的步驟會被跳過
#[derive(Debug, Clone)]
pub struct Converters {
    pub s2t: Option<ScriptConverter>,
    pub t2s: Option<ScriptConverter>,
    pub variants: Option<ScriptConverter>,
    pub custom: ScriptConverter,
}

impl Default for Converters {
    fn default() -> Self {
        Self {
            s2t: None,
            t2s: None,
            variants: None,
            custom: ScriptConverter::from_pairs("custom", CUSTOM_VARIANTS.iter().copied()),
        }
    }
}

impl Converters {
    /// 在內建異體字表之外追加自訂對照
    pub fn with_custom_variants<'a, I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let pairs: Vec<(String, String)> = extra
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .chain(CUSTOM_VARIANTS.iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .collect();
        self.custom = ScriptConverter::from_pairs("custom", pairs);
        self
    }
}

/// 匹配成功的步驟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPass {
    Exact,
    SimplifiedToTraditional,
    TraditionalToSimplified,
    Variant,
    CustomVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMatch {
    /// 輸入的地點名（檔名或統計表欄名）
    pub name: String,
    /// 對應到的簡稱
    pub abbreviation: String,
    pub pass: MatchPass,
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub matched: Vec<LocationMatch>,
    pub unmatched: Vec<String>,
}

/// 依序以五個步驟比對，每一步只處理前面未匹配的地點名
pub fn match_locations(
    names: &[String],
    table: &AbbreviationTable,
    converters: &Converters,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut pending: Vec<String> = names.to_vec();

    let passes: [(MatchPass, Option<&ScriptConverter>, bool); 5] = [
        (MatchPass::Exact, None, false),
        (MatchPass::SimplifiedToTraditional, converters.s2t.as_ref(), false),
        (MatchPass::TraditionalToSimplified, converters.t2s.as_ref(), true),
        (MatchPass::Variant, converters.variants.as_ref(), true),
        (MatchPass::CustomVariant, Some(&converters.custom), true),
    ];

    for (pass, converter, convert_name) in passes {
        if pending.is_empty() {
            break;
        }
        let converter = match (pass, converter) {
            (MatchPass::Exact, _) => None,
            (_, Some(converter)) => Some(converter),
            (_, None) => {
                tracing::debug!("Skipping {:?} pass: no converter configured", pass);
                continue;
            }
        };
        let convert = |text: &str| converter.map_or_else(|| text.to_string(), |c| c.convert(text));

        // 轉換後撞名時以表中較前的簡稱為準
        let mut lookup: HashMap<String, &str> = HashMap::new();
        for abbreviation in table.abbreviations() {
            lookup.entry(convert(abbreviation)).or_insert(abbreviation);
        }

        let mut still_pending = Vec::new();
        for name in pending {
            let key = if convert_name {
                convert(&name)
            } else {
                name.clone()
            };
            match lookup.get(&key) {
                Some(abbreviation) => {
                    tracing::debug!("{:?} match: {} -> {}", pass, name, abbreviation);
                    outcome.matched.push(LocationMatch {
                        name,
                        abbreviation: abbreviation.to_string(),
                        pass,
                    });
                }
                None => still_pending.push(name),
            }
        }
        pending = still_pending;
    }

    for name in &pending {
        tracing::warn!("⚠️ No abbreviation matches location '{}'", name);
    }
    outcome.unmatched = pending;
    outcome
}

/// 分區篩選："全部" 或空白代表不篩選，否則以空白分隔分區名
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartitionFilter {
    #[default]
    All,
    Only(HashSet<String>),
}

impl PartitionFilter {
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if spec.is_empty() || spec == ALL_PARTITIONS {
            PartitionFilter::All
        } else {
            PartitionFilter::Only(spec.split_whitespace().map(String::from).collect())
        }
    }

    pub fn accepts(&self, partition: &str) -> bool {
        match self {
            PartitionFilter::All => true,
            PartitionFilter::Only(set) => set.contains(partition),
        }
    }
}

/// 一欄地點：名稱（或分隔符）與其分區
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSlot {
    pub name: String,
    pub partition: String,
}

impl LocationSlot {
    pub fn is_separator(&self) -> bool {
        self.name == PARTITION_SEPARATOR || self.name == UNMATCHED_SEPARATOR
    }
}

/// 按簡稱表順序排列已匹配的地點，分區改變時插入 "_"
fn ordered_slots(
    outcome: &MatchOutcome,
    table: &AbbreviationTable,
    filter: &PartitionFilter,
) -> Vec<LocationSlot> {
    let mut by_abbreviation: HashMap<&str, Vec<&str>> = HashMap::new();
    for m in &outcome.matched {
        by_abbreviation
            .entry(m.abbreviation.as_str())
            .or_default()
            .push(m.name.as_str());
    }

    let mut slots = Vec::new();
    let mut previous: Option<&str> = None;
    let mut emitted: HashSet<&str> = HashSet::new();

    for (abbreviation, partition) in &table.entries {
        let Some(names) = by_abbreviation.get(abbreviation.as_str()) else {
            continue;
        };
        if !filter.accepts(partition) || !emitted.insert(abbreviation.as_str()) {
            continue;
        }
        for name in names {
            if previous.is_some_and(|p| p != partition) {
                slots.push(LocationSlot {
                    name: PARTITION_SEPARATOR.to_string(),
                    partition: String::new(),
                });
            }
            slots.push(LocationSlot {
                name: name.to_string(),
                partition: partition.clone(),
            });
            previous = Some(partition.as_str());
        }
    }
    slots
}

/// 頻率統計用：已匹配地點按簡稱表排序，之後接 "__" 與未匹配的地點
pub fn sort_locations(
    names: &[String],
    table: &AbbreviationTable,
    converters: &Converters,
) -> Vec<LocationSlot> {
    let outcome = match_locations(names, table, converters);
    let mut slots = ordered_slots(&outcome, table, &PartitionFilter::All);

    if !outcome.unmatched.is_empty() {
        slots.push(LocationSlot {
            name: UNMATCHED_SEPARATOR.to_string(),
            partition: String::new(),
        });
        slots.extend(outcome.unmatched.iter().map(|name| LocationSlot {
            name: name.clone(),
            partition: String::new(),
        }));
    }
    slots
}

/// 層級整理用：只保留篩選分區內已匹配的調查點，None 代表 "_" 佔位欄
pub fn select_surveys(
    names: &[String],
    table: &AbbreviationTable,
    converters: &Converters,
    filter: &PartitionFilter,
) -> Vec<Option<String>> {
    let outcome = match_locations(names, table, converters);
    tracing::info!(
        "📍 Matched {} locations, {} unmatched",
        outcome.matched.len(),
        outcome.unmatched.len()
    );
    ordered_slots(&outcome, table, filter)
        .into_iter()
        .map(|slot| (!slot.is_separator()).then_some(slot.name))
        .collect()
}
