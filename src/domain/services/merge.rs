use std::collections::HashMap;

/// 模糊音歸併：(主類, 歸入該主類的變體)。後面的組覆蓋前面的同名鍵，所以 xʱ 歸 x
const MERGE_GROUPS: &[(&str, &[&str])] = &[
    ("kʷ", &["kw", "kᵘ", "kᵛ", "kʋ", "kʷ", "kv"]),
    ("kʰw", &["kʷʰ", "kʰʷ", "kʰᵘ", "kʰᵛ", "kʰʋ", "kʋʰ", "kʰw", "kvʰ"]),
    ("pʰʋ", &["pʰw", "pʰᵘ", "pʰʋ"]),
    ("tʰw", &["tʰᵘ", "tʰw", "tʰʋ"]),
    ("ʔ", &["(ʔ)", "∅", "ʔ", "ˀ"]),
    ("ʋ", &["v", "ʋ", "vʋ", "w"]),
    ("h", &["h", "ɦ", "ɦʰ", "xʱ", "hɦ", "hʱ", "ʰ"]),
    ("hʷ", &["hʷ", "hw", "hʋ", "ɦʋ"]),
    ("x", &["x", "xʱ", "xɣ", "ɣ", "χ"]),
    ("xʷ", &["xv", "xʋ", "xʷ", "xᵊ", "xᶷ"]),
    ("d", &["d", "d\u{325}", "ɗ", "ɗw"]),
    ("dz", &["dz", "d\u{325}z\u{325}"]),
    ("dʑ", &["dʑ", "d\u{325}ʑ\u{325}"]),
    ("fw", &["fʋ", "fw", "fv", "fʰ", "fʱ", "f", "\u{30a}f"]),
    ("l", &["l", "l\u{325}", "l\u{329}"]),
    ("m", &["m", "m\u{325}", "m\u{329}", "m\u{361}b"]),
    ("mʷ", &["mʷ", "mw", "mʋ"]),
    ("mʰ", &["mʰ", "mɦ", "mʱ"]),
    ("sʷ", &["sw", "sʋ", "sʷ"]),
    ("tʰ", &["tʰʰ", "tʱ", "tʰ"]),
    ("ŋʷ", &["ŋʷ", "ŋw", "ŋʋ"]),
    ("ŋ", &["ŋ", "ŋ\u{30a}", "ŋɡ", "ŋ\u{361}ɡ", "ng", "nɡ"]),
    ("ɡ", &["ɡ", "g", "ɡ\u{30a}", "ᵑɡ"]),
    ("b", &["b\u{325}", "ɓw", "ɓ", "ᵐb", "b", "bv"]),
];

/// 變體 -> 主類 的查表
#[derive(Debug, Clone)]
pub struct MergeTable {
    map: HashMap<String, String>,
}

impl Default for MergeTable {
    fn default() -> Self {
        let mut map = HashMap::new();
        for (main, variants) in MERGE_GROUPS {
            for variant in *variants {
                map.insert(variant.to_string(), main.to_string());
            }
        }
        Self { map }
    }
}

impl MergeTable {
    /// 追加自訂歸併組，覆蓋內建的同名鍵
    pub fn with_groups<'a, I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<String>)>,
    {
        for (main, variants) in groups {
            for variant in variants {
                self.map.insert(variant.clone(), main.clone());
            }
        }
        self
    }

    pub fn main_class<'a>(&'a self, value: &'a str) -> &'a str {
        self.map.get(value).map(String::as_str).unwrap_or(value)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
