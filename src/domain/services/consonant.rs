use crate::domain::services::transcription::{
    apply_replacements, has_medial_palatal, is_digit, is_palatal, is_parsable, is_vowel,
    split_variants, SYLLABIC_ONSET, ZERO_INITIAL,
};

/// 無法判斷聲母時的前綴，整個音標保留下來供人工檢查
pub const UNPARSED_MARK: &str = "报错：";

/// 依序套用：送氣寫法、塞擦音連寫、異體字元
const ONSET_REPLACEMENTS: &[(&str, &str)] = &[
    ("∫", "ʃ"),
    ("th", "tʰ"),
    ("kh", "kʰ"),
    ("ph", "pʰ"),
    ("tsh", "tsʰ"),
    ("ς", "ɕ"),
    ("ts", "ʦ"),
    ("tʃ", "ʧ"),
    ("tɕ", "ʨ"),
    ("∨", "v"),
    ("ł", "ɬ"),
    ("tʰs", "ʦʰ"),
];

fn is_syllabic_onset(c: char) -> bool {
    SYLLABIC_ONSET.contains(c)
}

/// 從音標抽取聲母，多讀以 "/" 拆開後各自正規化
pub fn extract_onset(transcription: &str) -> Option<Vec<String>> {
    if !is_parsable(transcription) {
        return None;
    }

    let raw = raw_onset(transcription);
    if raw.starts_with(UNPARSED_MARK) {
        tracing::warn!("⚠️ Cannot determine initial of '{}'", transcription);
        return Some(vec![raw]);
    }

    Some(
        split_variants(&raw)
            .into_iter()
            .map(|part| apply_replacements(&part, ONSET_REPLACEMENTS))
            .collect(),
    )
}

fn raw_onset(phonetic: &str) -> String {
    let first = match phonetic.chars().next() {
        Some(c) => c,
        None => return String::new(),
    };
    let head: String = phonetic.chars().take_while(|&c| !is_digit(c)).collect();

    if !head.chars().any(is_vowel) {
        // 無元音：自成音節的鼻音、l、f 等
        if first == 'l' || first == 'f' {
            first.to_string()
        } else if is_syllabic_onset(first) {
            ZERO_INITIAL.to_string()
        } else if !phonetic.chars().any(is_syllabic_onset) {
            format!("{}{}", UNPARSED_MARK, phonetic)
        } else {
            phonetic
                .chars()
                .take_while(|&c| !(is_syllabic_onset(c) || is_digit(c)))
                .collect()
        }
    } else if is_vowel(first) {
        ZERO_INITIAL.to_string()
    } else if has_medial_palatal(phonetic) {
        phonetic
            .chars()
            .take_while(|&c| !(is_vowel(c) || is_palatal(c)))
            .collect()
    } else {
        phonetic
            .chars()
            .take_while(|&c| !is_vowel(c))
            .filter(|&c| !is_digit(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onset(t: &str) -> Vec<String> {
        extract_onset(t).unwrap_or_default()
    }

    #[test]
    fn test_plain_initials() {
        assert_eq!(onset("tuŋ1"), vec!["t"]);
        assert_eq!(onset("kʰɐu3"), vec!["kʰ"]);
        assert_eq!(onset("aŋ1"), vec!["∅"]);
    }

    #[test]
    fn test_aspiration_and_affricates_normalised() {
        assert_eq!(onset("thau1"), vec!["tʰ"]);
        assert_eq!(onset("tshi1"), vec!["ʦʰ"]);
        assert_eq!(onset("tsi2"), vec!["ʦ"]);
        assert_eq!(onset("tɕi1"), vec!["ʨ"]);
    }

    #[test]
    fn test_vowelless_syllables() {
        assert_eq!(onset("ŋ4"), vec!["∅"]);
        assert_eq!(onset("m2"), vec!["∅"]);
        assert_eq!(onset("lŋ4"), vec!["l"]);
        assert_eq!(onset("hm2"), vec!["h"]);
        assert_eq!(onset("ptk1"), vec!["报错：ptk1"]);
    }

    #[test]
    fn test_medial_palatal_stops_initial() {
        assert_eq!(onset("kjau1"), vec!["k"]);
        assert_eq!(onset("pʲɛn5"), vec!["p"]);
    }

    #[test]
    fn test_variants_split() {
        assert_eq!(onset("k/kʰɐu3"), vec!["k", "kʰ"]);
    }

    #[test]
    fn test_rejects_numeric() {
        assert!(extract_onset("55").is_none());
        assert!(extract_onset("").is_none());
    }
}
