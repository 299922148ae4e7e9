//! Sensitivity classifier: decides when a topic must not be rendered in the
//! upbeat/meme register.
//!
//! Keyword/category matching is a conservative, auditable substitute for a
//! real classifier. False positives only make the bot overly polite; false
//! negatives make it joke about a tragedy, so the patterns lean toward
//! recall.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Category patterns, Hindi + English: death/casualties, accidents and
/// disasters, medical emergencies, violence, fire/explosion, structural
/// collapse, negligence/corruption, civil unrest.
static SENSITIVE: Lazy<Vec<Regex>> = Lazy::new(|| {
    let raw = include_str!("../sensitive_patterns.json");
    let patterns: Vec<String> = serde_json::from_str(raw).expect("valid sensitive patterns");
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid sensitive pattern"))
        .collect()
});

/// Pure predicate: does the text touch any cautious-tone category?
/// Input is NFC-normalized first so decomposed Devanagari matras still match.
pub fn is_sensitive(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let t: String = text.nfc().collect();
    SENSITIVE.iter().any(|re| re.is_match(&t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_each_category() {
        for s in [
            "ट्रेन हादसा: कई घायल",
            "massive flood in Assam displaces thousands",
            "hospital runs out of oxygen आपूर्ति",
            "भ्रष्टाचार के आरोप में गिरफ्तारी",
            "fire breaks out in market",
            "पुल ढह गया, जांच शुरू",
            "riot curfew imposed downtown",
        ] {
            assert!(is_sensitive(s), "expected sensitive: {s}");
        }
    }

    #[test]
    fn benign_topics_pass() {
        for s in [
            "ISRO ने नया mission launch किया",
            "local train overcrowding despite new high-speed rail announcement",
            "मानसून में चाय की बिक्री बढ़ी",
            "",
        ] {
            assert!(!is_sensitive(s), "expected benign: {s}");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(is_sensitive("FLOOD warning issued"));
        assert!(is_sensitive("Corruption probe widens"));
    }
}
