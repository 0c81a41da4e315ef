use crate::domain::services::transcription::{
    apply_replacements, has_medial_palatal, is_cjk, is_digit, is_palatal, is_parsable,
    is_syllabic, is_vowel, split_variants,
};

/// 韻母抽取後的正規化：異體字元統一，預組鼻化元音拆成「元音 + U+0303」
const RHYME_REPLACEMENTS: &[(&str, &str)] = &[
    ("ε", "ɛ"),
    ("α", "ɑ"),
    ("ʯ", "ʮ"),
    ("∅", "ø"),
    ("ã", "a\u{303}"),
    ("ẽ", "e\u{303}"),
    ("ĩ", "i\u{303}"),
    ("ỹ", "y\u{303}"),
    ("õ", "o\u{303}"),
    ("ʱ", "ʰ"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhymeReading {
    /// 去掉開頭零聲母符號後的音標
    pub transcription: String,
    pub rhymes: Vec<String>,
}

/// 從音標抽取韻母；無法解析時回傳 None
pub fn extract_rhyme(transcription: &str) -> Option<RhymeReading> {
    if !is_parsable(transcription) {
        return None;
    }
    let phonetic = transcription.strip_prefix('∅').unwrap_or(transcription);

    let raw = if has_medial_palatal(phonetic) {
        medial_palatal_rhyme(phonetic)
    } else {
        plain_rhyme(phonetic)
    };

    let cleaned: String = raw.chars().filter(|&c| !(is_digit(c) || is_cjk(c))).collect();
    let rhymes = split_variants(&cleaned)
        .into_iter()
        .map(|part| apply_replacements(&part, RHYME_REPLACEMENTS))
        .collect();

    Some(RhymeReading {
        transcription: phonetic.to_string(),
        rhymes,
    })
}

/// 從第一個元音起，直到數字或空白為止；沒有元音時退而取自成音節的鼻音
fn plain_rhyme(phonetic: &str) -> String {
    let mut chars = phonetic.chars().skip_while(|&c| !is_vowel(c)).peekable();
    if chars.peek().is_some() {
        return chars
            .take_while(|&c| !(is_digit(c) || c.is_whitespace()))
            .collect();
    }

    phonetic
        .chars()
        .skip_while(|&c| !is_syllabic(c))
        .take_while(|&c| !(is_digit(c) || c.is_whitespace()))
        .collect()
}

/// 介音 j/ʲ 在中間時，從第一個元音或 j/ʲ 起取連續的非數字、非空白字元
fn medial_palatal_rhyme(phonetic: &str) -> String {
    phonetic
        .chars()
        .skip_while(|&c| !(is_vowel(c) || is_palatal(c)))
        .take_while(|&c| !(is_digit(c) || c.is_whitespace()))
        .collect()
}
