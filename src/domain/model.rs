use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 調查點字表中的一行：漢字與其音標
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRow {
    pub character: String,
    pub transcription: String,
}

/// 一個調查點（TSV 檔）的全部讀音
#[derive(Debug, Clone, Default)]
pub struct Survey {
    pub name: String,
    rows: Vec<SurveyRow>,
    index: HashMap<String, Vec<usize>>,
}

/// 字表中的佔位字，不參與統計
const PLACEHOLDER_CHARACTERS: [&str; 2] = ["□", "□ □"];

impl Survey {
    pub fn new(name: impl Into<String>, rows: Vec<SurveyRow>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            index.entry(row.character.clone()).or_default().push(i);
        }
        Self {
            name: name.into(),
            rows,
            index,
        }
    }

    pub fn rows(&self) -> &[SurveyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, character: &str) -> bool {
        self.index.contains_key(character)
    }

    /// 某字的所有讀音，依檔案順序
    pub fn readings<'a>(&'a self, character: &str) -> impl Iterator<Item = &'a SurveyRow> + 'a {
        self.index
            .get(character)
            .into_iter()
            .flatten()
            .map(move |&i| &self.rows[i])
    }

    /// 依選擇方式列出要處理的字，保持首次出現的順序並去重
    pub fn characters(&self, selection: &CharSelection) -> Vec<String> {
        match selection {
            CharSelection::All => {
                let mut seen = std::collections::HashSet::new();
                self.rows
                    .iter()
                    .map(|row| row.character.as_str())
                    .filter(|c| !PLACEHOLDER_CHARACTERS.contains(c))
                    .filter(|c| seen.insert(*c))
                    .map(String::from)
                    .collect()
            }
            CharSelection::Only(list) => {
                let mut seen = std::collections::HashSet::new();
                list.iter()
                    .filter(|c| seen.insert(c.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharSelection {
    #[default]
    All,
    Only(Vec<String>),
}

impl CharSelection {
    /// 空字串代表全部；否則每個字元都是一個查詢字
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("all") || spec == "全部" {
            CharSelection::All
        } else {
            CharSelection::Only(
                spec.chars()
                    .filter(|c| !c.is_whitespace() && *c != ',')
                    .map(String::from)
                    .collect(),
            )
        }
    }
}

/// 要抽取的音韻成分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// 聲母
    Consonant,
    /// 韻母
    #[default]
    Vowel,
    /// 聲調
    Tone,
}

impl Feature {
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Consonant => "聲母",
            Feature::Vowel => "韻母",
            Feature::Tone => "聲調",
        }
    }
}

/// 一次抽取的結果：漢字、（清理後的）音標、分類值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub character: String,
    pub transcription: String,
    pub value: String,
}

/// 從工作簿或 CSV 讀入的一張工作表：首行為表頭，空儲存格讀作空字串
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == header)
    }

    /// 超出該行長度的儲存格視為空
    pub fn value(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.trim())
            .unwrap_or("")
    }

    /// 某欄的所有非空值，依行順序
    pub fn column_values(&self, header: &str) -> Option<Vec<&str>> {
        let column = self.column_index(header)?;
        Some(
            (0..self.rows.len())
                .map(|row| self.value(row, column))
                .filter(|v| !v.is_empty())
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellNote {
    /// A1 形式的儲存格位置
    pub cell: String,
    pub row: usize,
    pub column: usize,
    pub text: String,
}

/// 輸出用的二維表；批註以 (列, 欄) 為鍵，皆從 0 起算
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Vec<String>>,
    notes: BTreeMap<(usize, usize), String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            notes: BTreeMap::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// 同一儲存格的多條批註以換行相接
    pub fn annotate(&mut self, row: usize, column: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.trim().is_empty() {
            return;
        }
        self.notes
            .entry((row, column))
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(text);
            })
            .or_insert_with(|| text.to_string());
    }

    pub fn note(&self, row: usize, column: usize) -> Option<&str> {
        self.notes.get(&(row, column)).map(String::as_str)
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }

    pub fn cell_notes(&self) -> Vec<CellNote> {
        self.notes
            .iter()
            .map(|(&(row, column), text)| CellNote {
                cell: cell_reference(row, column),
                row,
                column,
                text: text.clone(),
            })
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }
}

/// (0, 0) -> "A1", (4, 27) -> "AB5"
pub fn cell_reference(row: usize, column: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", letters.into_iter().collect::<String>(), row + 1)
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub tables: Vec<Table>,
    pub summary: serde_json::Value,
}

impl TransformResult {
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }
}
