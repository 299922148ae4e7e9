//! Text normalization for incoming topics and generated bodies.
//!
//! Script detection (how much of a text is Devanagari), Devanagari→ASCII
//! numeral mapping, profanity masking, and feed-title cleanup. All functions
//! are pure; masking and numeral mapping are idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replacement token for masked terms. Chosen so it never re-matches the
/// lexicon (masking must be idempotent).
pub const MASK_TOKEN: &str = "〔हटाया गया〕";

static PROFANITY: Lazy<Vec<Regex>> = Lazy::new(|| {
    let raw = include_str!("../profanity_lexicon.json");
    let terms: Vec<String> = serde_json::from_str(raw).expect("valid profanity lexicon");
    terms
        .iter()
        .map(|t| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(t))).expect("valid profanity pattern")
        })
        .collect()
});

/// True if the char sits in the Devanagari block (U+0900–U+097F).
#[inline]
fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(is_devanagari)
}

/// Fraction of letter characters that are Devanagari, in [0.0, 1.0].
/// Whitespace, punctuation, digits and emoji are ignored, so a Hindi line
/// peppered with English numerals still scores high.
pub fn devanagari_fraction(text: &str) -> f32 {
    let mut total = 0usize;
    let mut hindi = 0usize;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        total += 1;
        if is_devanagari(c) {
            hindi += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    hindi as f32 / total as f32
}

/// Map Devanagari digit glyphs (०–९) to ASCII digits. One-to-one,
/// order-preserving, idempotent.
pub fn normalize_numerals(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '०' => '0',
            '१' => '1',
            '२' => '2',
            '३' => '3',
            '४' => '4',
            '५' => '5',
            '६' => '6',
            '७' => '7',
            '८' => '8',
            '९' => '9',
            other => other,
        })
        .collect()
}

/// Replace each word-boundary match of the fixed slur list with [`MASK_TOKEN`].
/// Substrings inside longer legitimate words are left alone.
pub fn mask_profanity(text: &str) -> String {
    let mut out = text.to_string();
    for re in PROFANITY.iter() {
        out = re.replace_all(&out, MASK_TOKEN).into_owned();
    }
    out
}

/// Clean a raw feed title: decode HTML entities, normalize typographic
/// quotes to ASCII, collapse whitespace, trim.
pub fn clean_topic(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    RE_WS.replace_all(&out, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_ignores_digits_and_punctuation() {
        let s = "दिल्ली AQI 400+ है!";
        // Letters: दिल्ली + है (Devanagari) vs AQI (Latin)
        let f = devanagari_fraction(s);
        assert!(f > 0.5 && f < 1.0, "mixed text should land in (0.5, 1.0), got {f}");
        assert!((devanagari_fraction("only english words") - 0.0).abs() < f32::EPSILON);
        assert!((devanagari_fraction("सिर्फ हिंदी") - 1.0).abs() < f32::EPSILON);
        assert_eq!(devanagari_fraction("12345 ... !!"), 0.0);
    }

    #[test]
    fn numerals_map_and_are_idempotent() {
        let once = normalize_numerals("साल २०२५ में ९ ट्रेनें");
        assert_eq!(once, "साल 2025 में 9 ट्रेनें");
        assert_eq!(normalize_numerals(&once), once);
    }

    #[test]
    fn profanity_is_masked_on_word_boundaries_only() {
        let masked = mask_profanity("what an idiot move");
        assert!(masked.contains(MASK_TOKEN));
        assert!(!masked.contains("idiot"));
        // "idiotic" must not be partially masked
        assert_eq!(mask_profanity("idiotic bureaucracy"), "idiotic bureaucracy");
    }

    #[test]
    fn masking_is_idempotent() {
        let once = mask_profanity("ये हरामी सिस्टम");
        assert_eq!(mask_profanity(&once), once);
    }

    #[test]
    fn clean_topic_decodes_and_collapses() {
        assert_eq!(clean_topic("  Train &amp; metro\n  update  "), "Train & metro update");
        assert_eq!(clean_topic("“quote” test"), "\"quote\" test");
    }
}
