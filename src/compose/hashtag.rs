//! Hashtag derivation from a Devanagari source text.
//!
//! Tokens are stripped to Devanagari + digits, filtered against a stop list
//! and a minimum length, deduplicated preserving first-seen order, and
//! capped.

use std::collections::HashSet;

use once_cell::sync::Lazy;

static STOPWORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    let raw = include_str!("../../hashtag_stopwords.json");
    let words: Vec<String> = serde_json::from_str(raw).expect("valid stopword list");
    words.into_iter().collect()
});

const MIN_TOKEN_CHARS: usize = 3;

fn clean_token(tok: &str) -> String {
    tok.chars()
        .filter(|c| c.is_ascii_digit() || ('\u{0900}'..='\u{097F}').contains(c))
        .collect()
}

/// Derive up to `max_count` hashtags. Returns `None` when nothing survives
/// filtering.
pub fn hashtagify(text: &str, max_count: usize) -> Option<String> {
    if max_count == 0 {
        return None;
    }
    let mut seen: HashSet<String> = HashSet::new();
    let mut tags: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let tok = clean_token(word);
        if tok.chars().count() < MIN_TOKEN_CHARS || STOPWORDS.contains(&tok) {
            continue;
        }
        if !seen.insert(tok.clone()) {
            continue;
        }
        tags.push(format!("#{tok}"));
        if tags.len() >= max_count {
            break;
        }
    }
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_capped_deduped_tags() {
        let src = "लोकल ट्रेन में भीड़ है और ट्रेन फिर लेट है";
        let tags = hashtagify(src, 2).expect("tags");
        let parts: Vec<&str> = tags.split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|t| t.starts_with('#')));
        // "ट्रेन" appears twice in the source but only once as a tag
        assert_eq!(parts.iter().filter(|t| **t == "#ट्रेन").count(), 1);
    }

    #[test]
    fn stopwords_and_short_tokens_are_dropped() {
        assert_eq!(hashtagify("है और के से", 3), None);
        assert_eq!(hashtagify("दो", 3), None);
    }

    #[test]
    fn latin_only_source_yields_nothing() {
        assert_eq!(hashtagify("plain english words only", 3), None);
    }

    #[test]
    fn zero_cap_yields_nothing() {
        assert_eq!(hashtagify("महंगाई बढ़ी", 0), None);
    }
}
