use crate::domain::model::{CharSelection, Extraction, Feature, Survey};
use crate::domain::services::{consonant, tone, vowel};
use std::collections::HashMap;

/// 按選字順序、再按檔案順序抽取每個讀音的聲母／韻母／聲調
pub fn extract(survey: &Survey, feature: Feature, selection: &CharSelection) -> Vec<Extraction> {
    let tone_system = match feature {
        Feature::Tone => Some(tone::detect_tone_system(survey)),
        _ => None,
    };

    let mut results = Vec::new();
    let mut skipped = 0usize;

    for character in survey.characters(selection) {
        for row in survey.readings(&character) {
            let classified: Option<(String, Vec<String>)> = match feature {
                Feature::Vowel => vowel::extract_rhyme(&row.transcription)
                    .map(|reading| (reading.transcription, reading.rhymes)),
                Feature::Consonant => consonant::extract_onset(&row.transcription)
                    .map(|onsets| (row.transcription.clone(), onsets)),
                Feature::Tone => tone_system
                    .and_then(|system| tone::extract_tone(&row.transcription, system))
                    .map(|name| (row.transcription.clone(), vec![name.to_string()])),
            };

            let Some((transcription, values)) = classified else {
                skipped += 1;
                continue;
            };

            for value in values {
                if value.is_empty() {
                    tracing::debug!(
                        "{}: no {} in '{}' ({})",
                        survey.name,
                        feature.label(),
                        transcription,
                        character
                    );
                    skipped += 1;
                    continue;
                }
                results.push(Extraction {
                    character: character.clone(),
                    transcription: transcription.clone(),
                    value,
                });
            }
        }
    }

    tracing::debug!(
        "{}: extracted {} {} values, skipped {}",
        survey.name,
        results.len(),
        feature.label(),
        skipped
    );
    results
}

/// 字 -> [(分類值, 音標)]，供層級整理時查表
pub type PhoneticMap = HashMap<String, Vec<(String, String)>>;

pub fn phonetic_map(survey: &Survey, feature: Feature) -> PhoneticMap {
    let mut map: PhoneticMap = HashMap::new();
    for extraction in extract(survey, feature, &CharSelection::All) {
        map.entry(extraction.character)
            .or_default()
            .push((extraction.value, extraction.transcription));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SurveyRow;

    fn survey() -> Survey {
        let rows = [
            ("東", "tuŋ1"),
            ("時", "si2"),
            ("窮", "kʰuŋ2"),
            ("東", "toŋ1"),
            ("□", "a1"),
            ("五", "ŋ4"),
            ("一", "55"),
        ];
        Survey::new(
            "測試",
            rows.iter()
                .map(|(c, t)| SurveyRow {
                    character: c.to_string(),
                    transcription: t.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_extract_vowels_in_character_order() {
        let result = extract(&survey(), Feature::Vowel, &CharSelection::All);
        let pairs: Vec<(&str, &str)> = result
            .iter()
            .map(|e| (e.character.as_str(), e.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("東", "uŋ"), ("東", "oŋ"), ("時", "i"), ("窮", "uŋ"), ("五", "ŋ")]
        );
    }

    #[test]
    fn test_extract_consonants_for_selection() {
        let selection = CharSelection::Only(vec!["五".to_string(), "東".to_string()]);
        let result = extract(&survey(), Feature::Consonant, &selection);
        let values: Vec<&str> = result.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["∅", "t", "t"]);
    }

    #[test]
    fn test_extract_tones_uses_detected_system() {
        let result = extract(&survey(), Feature::Tone, &CharSelection::All);
        let values: Vec<&str> = result.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["陰平", "陰平", "陽平", "陽平", "陽上", "未知"]);
    }

    #[test]
    fn test_phonetic_map_groups_readings() {
        let map = phonetic_map(&survey(), Feature::Vowel);
        assert_eq!(map["東"].len(), 2);
        assert_eq!(map["東"][1], ("oŋ".to_string(), "toŋ1".to_string()));
        assert!(!map.contains_key("一"));
    }
}
