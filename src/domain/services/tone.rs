use crate::domain::model::Survey;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static FIRST_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid regex"));
static TRAILING_TONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+[a-z]?)$").expect("valid regex"));

pub const UNKNOWN_TONE: &str = "未知";

const YINDIAN: &[(&str, &str)] = &[
    ("1", "陰平"), ("1a", "陰平甲"), ("1b", "陰平乙"), ("1A", "陰平甲"), ("1B", "陰平乙"),
    ("2", "陽平"), ("2a", "陽平甲"), ("2b", "陽平乙"), ("2A", "陽平甲"), ("2B", "陽平乙"),
    ("3", "陰上"), ("3a", "陰上甲"), ("3b", "陰上乙"), ("3A", "陰上甲"), ("3B", "陰上乙"),
    ("4", "陽上"), ("4a", "陽上甲"), ("4b", "陽上乙"), ("4A", "陽上甲"), ("4B", "陽上乙"),
    ("5", "陰去"), ("5a", "陰去甲"), ("5b", "陰去乙"), ("5A", "陰去甲"), ("5B", "陰去乙"),
    ("6", "陽去"), ("6a", "陽去甲"), ("6b", "陽去乙"), ("6A", "陽去甲"), ("6B", "陽去乙"),
    ("7", "陰入"), ("7a", "上陰入"), ("7b", "下陰入"), ("7c", "陰入丙"), ("7A", "上陰入"),
    ("7B", "下陰入"),
    ("8", "陽入"), ("8a", "上陽入"), ("8b", "下陽入"), ("8A", "上陽入"), ("8B", "下陽入"),
    ("9", "變調"), ("9a", "變調1"), ("9b", "變調2"), ("0", "變調"), ("10", "輕聲"),
    ("輕聲", "輕聲"),
];

const JYUTPING: &[(&str, &str)] = &[
    ("1", "陰平"), ("2", "陰上"), ("3", "陰去"), ("4", "陽平"), ("5", "陽上"), ("6", "陽去"),
    ("7", "上陰入"), ("8", "下陰入"), ("9", "陽入"), ("10", "下陽入"), ("0", "變調"),
];

static YINDIAN_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| YINDIAN.iter().copied().collect());
static JYUTPING_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| JYUTPING.iter().copied().collect());

/// 調號體系：音典按中古四聲八調編號，粵拼按粵語傳統編號
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneSystem {
    Yindian,
    Jyutping,
}

impl ToneSystem {
    fn table(&self) -> &'static HashMap<&'static str, &'static str> {
        match self {
            ToneSystem::Yindian => &YINDIAN_MAP,
            ToneSystem::Jyutping => &JYUTPING_MAP,
        }
    }

    /// 先查本體系，查不到再退回音典表
    pub fn name_of(&self, code: &str) -> &'static str {
        self.table()
            .get(code)
            .or_else(|| YINDIAN_MAP.get(code))
            .copied()
            .unwrap_or(UNKNOWN_TONE)
    }
}

/// 以「時」「窮」兩字的調號判斷體系：音典兩字皆陽平 2，粵拼皆陽平 4
pub fn detect_tone_system(survey: &Survey) -> ToneSystem {
    let probe = |character: &str| -> Option<String> {
        let row = survey.readings(character).next()?;
        let caps = FIRST_DIGITS.captures(&row.transcription)?;
        Some(strip_leading_zeros(&caps[1]))
    };

    let shi = probe("時");
    let qiong = probe("窮");
    let codes = [shi.as_deref(), qiong.as_deref()];

    let system = if codes.contains(&Some("2")) {
        ToneSystem::Yindian
    } else if codes.iter().all(|c| matches!(c, None | Some("4"))) {
        ToneSystem::Jyutping
    } else {
        ToneSystem::Yindian
    };
    tracing::debug!(
        "Tone system for {}: {:?} (時={:?}, 窮={:?})",
        survey.name,
        system,
        shi,
        qiong
    );
    system
}

/// 音標結尾的調號（去掉前導 0，"03" 與 "3" 視為同一調）
pub fn tone_code(transcription: &str) -> Option<String> {
    let caps = TRAILING_TONE.captures(transcription)?;
    Some(strip_leading_zeros(&caps[1]))
}

/// "03" -> "3"，但單獨的 "0"（變調）保留
fn strip_leading_zeros(code: &str) -> String {
    let stripped = code.trim_start_matches('0');
    if code.starts_with('0') && !stripped.starts_with(|c: char| c.is_ascii_digit()) {
        format!("0{}", stripped)
    } else {
        stripped.to_string()
    }
}

pub fn extract_tone(transcription: &str, system: ToneSystem) -> Option<&'static str> {
    if transcription.trim().is_empty() {
        return None;
    }
    tone_code(transcription).map(|code| system.name_of(&code))
}
