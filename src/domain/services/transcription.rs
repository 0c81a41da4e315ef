//! 音標字元分類與共用的切分、清理工具。

/// 元音（含常見的誤錄字元與零聲母符號）
pub const VOWELS: &str = "iyɨʉɯuɪʏɿʅɭıſ\u{f25d}ɩɷʮɥʯʊeɘɵəɤoɛεɝɚᴇœɜɞʌɔæaɶɑɒᴀɐãẽĩỹõúαᵘᶷᶤᶶᵚʸᶦᵊⁱ◌∅ø";

/// 可自成音節的鼻音與擦音
pub const SYLLABIC: &str = "mnŋȵƞʋvʒ";

/// 無元音時的聲母截止字元；部分調查點把 ɿ 錄成 f、l
pub const SYLLABIC_ONSET: &str = "mnŋȵƞʋvʒlf";

pub const ZERO_INITIAL: &str = "∅";

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(c)
}

pub fn is_syllabic(c: char) -> bool {
    SYLLABIC.contains(c)
}

pub fn is_palatal(c: char) -> bool {
    c == 'j' || c == 'ʲ'
}

/// Unicode 數字（與原始字表的阿拉伯數字調號一致）
pub fn is_digit(c: char) -> bool {
    c.is_numeric()
}

pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// 首字元之後是否出現 j / ʲ（介音在中間）
pub fn has_medial_palatal(transcription: &str) -> bool {
    transcription.chars().skip(1).any(is_palatal)
}

/// 空白、純數字或以數字開頭的音標都不是可解析的讀音
pub fn is_parsable(transcription: &str) -> bool {
    match transcription.chars().next() {
        None => false,
        Some(first) => !is_digit(first),
    }
}

/// 以 "/" 分隔的多讀拆成多條；單獨的 "/" 保持原樣
pub fn split_variants(value: &str) -> Vec<String> {
    if value.contains('/') && value.trim() != "/" {
        value.split('/').map(|part| part.trim().to_string()).collect()
    } else {
        vec![value.to_string()]
    }
}

/// 依序套用替換表
pub fn apply_replacements(value: &str, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .fold(value.to_string(), |acc, (from, to)| acc.replace(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_classes() {
        assert!(is_vowel('ɐ'));
        assert!(is_vowel('∅'));
        assert!(!is_vowel('ŋ'));
        assert!(is_syllabic('ŋ'));
        assert!(!is_syllabic('l'));
        assert!(SYLLABIC_ONSET.contains('f'));
        assert!(is_cjk('東'));
        assert!(!is_cjk('a'));
    }

    #[test]
    fn test_parsable() {
        assert!(is_parsable("tuŋ1"));
        assert!(!is_parsable(""));
        assert!(!is_parsable("55"));
        assert!(!is_parsable("1a"));
    }

    #[test]
    fn test_split_variants() {
        assert_eq!(split_variants("uŋ/oŋ"), vec!["uŋ", "oŋ"]);
        assert_eq!(split_variants(" / "), vec![" / "]);
        assert_eq!(split_variants("aŋ"), vec!["aŋ"]);
    }

    #[test]
    fn test_medial_palatal() {
        assert!(has_medial_palatal("kjau1"));
        assert!(!has_medial_palatal("jau4"));
    }
}
