//! 例字歸納：同一組例字在某調查點最常見的聲母或韻母，其餘讀法寫入批註。

use crate::domain::model::{Feature, Survey};
use crate::domain::services::transcription::{is_digit, ZERO_INITIAL};

/// 韻母歸納用的元音集合（沒有上標元音，多了 ʒ）
const CONSENSUS_VOWELS: &str =
    "iyɨʉɯuɪʏɿʅɭıſ\u{f25d}ɩɷʮɥʯʊeɘɵəɤoɛεɝɚᴇœɜɞʌɔæaɶɑɒᴀɐãẽĩỹõʒúαᵊⁱ◌∅ø";

/// 聲母歸納只認基本元音
const PLAIN_VOWELS: &str = "iyɨʉɯuɪʏɿʅʊeøɘəɵɤoɛœɜɞʌɔæaɶɑɒɐ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consensus {
    pub value: String,
    pub annotation: String,
}

fn strip_brackets(transcription: &str) -> String {
    transcription
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '{' | '}'))
        .collect()
}

/// 每一段從第一個元音起，到數字或空白為止
fn rhyme_values(transcription: &str) -> Vec<String> {
    strip_brackets(transcription)
        .split('/')
        .filter(|segment| !segment.trim().is_empty())
        .filter_map(|segment| {
            let rhyme: String = segment
                .chars()
                .skip_while(|&c| !CONSENSUS_VOWELS.contains(c))
                .take_while(|&c| !(is_digit(c) || c.is_whitespace()))
                .collect();
            (!rhyme.is_empty()).then_some(rhyme)
        })
        .collect()
}

fn onset_value(transcription: &str) -> Option<String> {
    let phonetic = strip_brackets(transcription);
    let first = phonetic.chars().next()?;
    let is_plain_vowel = |c: char| PLAIN_VOWELS.contains(c);
    let has_vowel = phonetic.chars().any(is_plain_vowel);

    let onset = if is_plain_vowel(first) {
        ZERO_INITIAL.to_string()
    } else if !has_vowel && matches!(first, 'm' | 'n' | 'ŋ') {
        ZERO_INITIAL.to_string()
    } else if !has_vowel {
        first.to_string()
    } else {
        phonetic.chars().take_while(|&c| !is_plain_vowel(c)).collect()
    };
    Some(onset)
}

/// 一個讀音可得到的歸納值（韻母模式下每個 "/" 段各一個）
pub fn reading_values(transcription: &str, feature: Feature) -> Vec<String> {
    match feature {
        Feature::Consonant => onset_value(transcription).into_iter().collect(),
        _ => rhyme_values(transcription),
    }
}

/// 一組例字（不含 "/"）在某調查點的歸納結果
fn block_consensus(block: &str, survey: &Survey, feature: Feature) -> Consensus {
    // (值, 出現該值的字) 依首次出現排列
    let mut tallies: Vec<(String, usize, Vec<String>)> = Vec::new();

    for character in block.chars().map(String::from) {
        for row in survey.readings(&character) {
            if row.transcription.is_empty() {
                continue;
            }
            for value in reading_values(&row.transcription, feature) {
                match tallies.iter_mut().find(|(v, _, _)| *v == value) {
                    Some((_, count, chars)) => {
                        *count += 1;
                        if !chars.contains(&character) {
                            chars.push(character.clone());
                        }
                    }
                    None => tallies.push((value, 1, vec![character.clone()])),
                }
            }
        }
    }

    if tallies.is_empty() {
        tracing::debug!("{}: no {} for '{}'", survey.name, feature.label(), block);
        return Consensus::default();
    }

    // 次數相同時取先出現者
    let mut best = 0;
    for (i, (_, count, _)) in tallies.iter().enumerate() {
        if *count > tallies[best].1 {
            best = i;
        }
    }

    let annotation = tallies
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != best)
        .map(|(_, (value, _, chars))| format!("{}: {}", value, chars.join(",")))
        .collect::<Vec<_>>()
        .join("，");

    Consensus {
        value: tallies[best].0.clone(),
        annotation,
    }
}

/// 例字格以 "/" 分組，各組分別歸納後以 "/" 相接，批註以空格相接
pub fn consensus(cell: &str, survey: &Survey, feature: Feature) -> Consensus {
    if cell.trim().is_empty() {
        return Consensus::default();
    }

    let results: Vec<Consensus> = cell
        .split('/')
        .map(|block| block_consensus(block, survey, feature))
        .collect();

    Consensus {
        value: results
            .iter()
            .map(|c| c.value.as_str())
            .collect::<Vec<_>>()
            .join("/"),
        annotation: results
            .iter()
            .map(|c| c.annotation.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SurveyRow;

    fn survey(rows: &[(&str, &str)]) -> Survey {
        Survey::new(
            "廣州",
            rows.iter()
                .map(|(c, t)| SurveyRow {
                    character: c.to_string(),
                    transcription: t.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_majority_rhyme_with_annotation() {
        let s = survey(&[("東", "tuŋ1"), ("通", "tʰuŋ1"), ("同", "tʰoŋ2"), ("同", "tʰuŋ2")]);
        let result = consensus("東通同", &s, Feature::Vowel);
        assert_eq!(result.value, "uŋ");
        assert_eq!(result.annotation, "oŋ: 同");
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let s = survey(&[("東", "tuŋ1"), ("冬", "toŋ1")]);
        let result = consensus("東冬", &s, Feature::Vowel);
        assert_eq!(result.value, "uŋ");
        assert_eq!(result.annotation, "oŋ: 冬");
    }

    #[test]
    fn test_blocks_joined_by_slash() {
        let s = survey(&[("東", "tuŋ1"), ("江", "kɔŋ1"), ("講", "kɔŋ3")]);
        let result = consensus("東/江講/缺", &s, Feature::Vowel);
        assert_eq!(result.value, "uŋ/ɔŋ/");
        assert_eq!(result.annotation, "");
    }

    #[test]
    fn test_brackets_and_variant_segments() {
        assert_eq!(reading_values("(t)uŋ1/oŋ1", Feature::Vowel), vec!["uŋ", "oŋ"]);
    }

    #[test]
    fn test_onset_consensus() {
        let s = survey(&[("幫", "pɔŋ1"), ("邊", "pin1"), ("冰", "peŋ1"), ("五", "ŋ4"), ("亞", "a3")]);
        assert_eq!(consensus("幫邊冰", &s, Feature::Consonant).value, "p");
        assert_eq!(consensus("五亞", &s, Feature::Consonant).value, "∅");
        assert_eq!(reading_values("hm2", Feature::Consonant), vec!["h"]);
    }

    #[test]
    fn test_empty_cell() {
        let s = survey(&[]);
        assert_eq!(consensus("  ", &s, Feature::Vowel), Consensus::default());
    }
}
