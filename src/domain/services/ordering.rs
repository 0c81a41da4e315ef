use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::collections::HashMap;

/// 輸出時的類別順序：先聲母，後韻母，最後調類
const CLASS_ORDER: &[&str] = &[
    "p", "pʰ", "t", "tʰ", "k", "kʰ", "f", "ʋ", "ɸ", "h",
    "x", "l", "n", "m", "ŋ", "ɲ", "ȵ", "j", "z", "s", "ʃ",
    "ʂ", "ɕ", "θ", "ɬ", "b", "d", "g", "ʒ", "ʑ", "ʐ",
    "ʦ", "ʧ", "ʨ", "tʂ", "tɹ", "tr", "tθ", "dz", "dʑ", "dʐ", "dʒ",
    "ʦʰ", "ʧʰ", "ʨʰ", "tʂʰ", "tɹʰ", "trʰ", "tθʰ", "dzʰ", "dʑʰ", "dʐʰ", "dʒʰ",
    "ʔ", "a", "ia", "ua", "ᴀ", "ɑ", "æ", "ɐ", "iɐ", "uɐ",
    "ə", "iə", "uə", "ᴇ", "ɛ", "œ", "iɛ", "uɛ", "ɜ", "ɞ", "ʌ",
    "ɔ", "iɔ", "uɔ", "o", "io", "uo", "ɤ", "ɵ", "ɘ",
    "ø", "iø", "e", "ie", "ʊ", "u", "ɯ", "y", "i", "ɿ", "ʮ",
    "陰平", "陰平甲", "陰平乙", "陽平", "陽平甲", "陽平乙", "陰上", "陰上甲", "陰上乙",
    "陽上", "陽上甲", "陽上乙", "陰去", "陰去甲", "陰去乙", "陽去", "陽去甲", "陽去乙",
    "陰入", "上陰入", "下陰入", "陽入", "上陽入", "下陽入", "變調", "變調1", "變調2", "輕聲",
];

static ORDER_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (i, class) in CLASS_ORDER.iter().enumerate() {
        index.entry(*class).or_insert(i);
    }
    index
});

/// 整個類別在表中時直接取其序號；否則逐字元位置取權重：
/// 兩字元窗口在表中則取其序號，否則取單字元序號，都不在則排最後
pub fn sort_key(class: &str) -> Vec<usize> {
    if let Some(&index) = ORDER_INDEX.get(class) {
        return vec![index];
    }
    let chars: Vec<char> = class.chars().collect();
    (0..chars.len())
        .map(|i| {
            let pair: String = chars[i..chars.len().min(i + 2)].iter().collect();
            let single = chars[i].to_string();
            ORDER_INDEX
                .get(pair.as_str())
                .or_else(|| ORDER_INDEX.get(single.as_str()))
                .copied()
                .unwrap_or(usize::MAX)
        })
        .collect()
}

pub fn compare_classes(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

pub fn sort_classes<S: AsRef<str>>(classes: &mut [S]) {
    classes.sort_by(|a, b| compare_classes(a.as_ref(), b.as_ref()));
}
