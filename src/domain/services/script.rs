use std::collections::HashMap;

/// 字形轉換表（簡轉繁、繁轉簡、異體字），按最長詞條優先替換
#[derive(Debug, Clone, Default)]
pub struct ScriptConverter {
    name: String,
    table: HashMap<String, String>,
    max_key_chars: usize,
}

impl ScriptConverter {
    /// 同一個鍵出現多次時保留第一個
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = HashMap::new();
        let mut max_key_chars = 0;
        for (key, value) in pairs {
            let key = key.into();
            if key.is_empty() {
                continue;
            }
            max_key_chars = max_key_chars.max(key.chars().count());
            table.entry(key).or_insert_with(|| value.into());
        }
        Self {
            name: name.into(),
            table,
            max_key_chars,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn convert(&self, text: &str) -> String {
        if self.table.is_empty() {
            return text.to_string();
        }
        let chars: Vec<char> = text.chars().collect();
        let mut output = String::with_capacity(text.len());
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_key_chars.min(chars.len() - i);
            let hit = (1..=longest).rev().find_map(|width| {
                let candidate: String = chars[i..i + width].iter().collect();
                self.table.get(&candidate).map(|value| (width, value))
            });
            match hit {
                Some((width, value)) => {
                    output.push_str(value);
                    i += width;
                }
                None => {
                    output.push(chars[i]);
                    i += 1;
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_character_conversion() {
        let s2t = ScriptConverter::from_pairs("s2t", [("广", "廣"), ("东", "東"), ("门", "門")]);
        assert_eq!(s2t.convert("广东江门"), "廣東江門");
    }

    #[test]
    fn test_longest_key_wins() {
        let t2s = ScriptConverter::from_pairs("t2s", [("乾", "干"), ("乾隆", "乾隆"), ("隆", "隆")]);
        assert_eq!(t2s.convert("乾隆乾"), "乾隆干");
    }

    #[test]
    fn test_first_definition_kept() {
        let converter = ScriptConverter::from_pairs("v", [("淸", "清"), ("淸", "靑")]);
        assert_eq!(converter.convert("淸遠"), "清遠");
        assert_eq!(converter.len(), 1);
    }

    #[test]
    fn test_empty_converter_is_identity() {
        assert_eq!(ScriptConverter::default().convert("廣州"), "廣州");
    }
}
