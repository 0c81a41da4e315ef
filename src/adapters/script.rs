use crate::domain::ports::Storage;
use crate::domain::services::location::Converters;
use crate::domain::services::script::ScriptConverter;
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 字形轉換詞典的位置，每種轉換可由多個 OpenCC 詞典檔組成（如 STCharacters.txt + STPhrases.txt）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptSettings {
    #[serde(default)]
    pub s2t: Vec<String>,
    #[serde(default)]
    pub t2s: Vec<String>,
    #[serde(default)]
    pub variants: Vec<String>,
    /// 追加在內建異體字表之前的自訂對照
    #[serde(default)]
    pub custom_variants: BTreeMap<String, String>,
}

/// OpenCC 詞典格式：每行 "詞<TAB>候選1 候選2"，取第一個候選；空行與 # 開頭的行略過
pub fn parse_dictionary(file: &str, text: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim_start_matches('\u{feff}').trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, candidates)) = line.split_once('\t') else {
            return Err(EtlError::ProcessingError {
                message: format!("{}:{}: expected '<key>\\t<candidates>'", file, number + 1),
            });
        };
        match candidates.split_whitespace().next() {
            Some(first) => pairs.push((key.trim().to_string(), first.to_string())),
            None => tracing::debug!("{}:{}: entry '{}' has no candidate", file, number + 1, key),
        }
    }
    Ok(pairs)
}

async fn load_converter<S: Storage>(
    storage: &S,
    name: &str,
    files: &[String],
) -> Result<Option<ScriptConverter>> {
    if files.is_empty() {
        return Ok(None);
    }
    let mut pairs = Vec::new();
    for file in files {
        let data = storage.read_file(file).await?;
        let text = String::from_utf8_lossy(&data);
        pairs.extend(parse_dictionary(file, &text)?);
    }
    let converter = ScriptConverter::from_pairs(name, pairs);
    tracing::debug!("Loaded {} converter with {} entries", name, converter.len());
    Ok(Some(converter))
}

pub async fn load_converters<S: Storage>(storage: &S, settings: &ScriptSettings) -> Result<Converters> {
    let converters = Converters {
        s2t: load_converter(storage, "s2t", &settings.s2t).await?,
        t2s: load_converter(storage, "t2s", &settings.t2s).await?,
        variants: load_converter(storage, "variants", &settings.variants).await?,
        ..Converters::default()
    };
    Ok(converters.with_custom_variants(&settings.custom_variants))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::mock::MockStorage;

    #[test]
    fn test_parse_opencc_dictionary() {
        let text = "# comment\n广\t廣 広\n\n干\t幹 乾 干\n";
        let pairs = parse_dictionary("s2t.txt", text).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("广".to_string(), "廣".to_string()),
                ("干".to_string(), "幹".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_line() {
        assert!(parse_dictionary("bad.txt", "广 廣\n").is_err());
    }

    #[tokio::test]
    async fn test_load_converters_merges_files() {
        let storage = MockStorage::new();
        storage.put("STCharacters.txt", "东\t東\n").await;
        storage.put("STPhrases.txt", "东莞\t東莞\n").await;

        let settings = ScriptSettings {
            s2t: vec!["STCharacters.txt".to_string(), "STPhrases.txt".to_string()],
            ..ScriptSettings::default()
        };
        let converters = load_converters(&storage, &settings).await.unwrap();
        let s2t = converters.s2t.unwrap();
        assert_eq!(s2t.convert("东莞东"), "東莞東");
        assert!(converters.t2s.is_none());
        assert_eq!(converters.custom.convert("淸遠"), "清遠");
    }

    #[tokio::test]
    async fn test_custom_variants_take_precedence() {
        let storage = MockStorage::new();
        let mut settings = ScriptSettings::default();
        settings
            .custom_variants
            .insert("淸".to_string(), "青".to_string());
        let converters = load_converters(&storage, &settings).await.unwrap();
        assert_eq!(converters.custom.convert("淸"), "青");
        assert_eq!(converters.custom.convert("峯"), "峰");
    }
}
