//! Body sanitization steps, applied to raw generator output in a fixed
//! order. Each step assumes the previous step's output shape, so the order
//! in [`super::Composer::sanitize_body`] matters.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_FORBIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(#\S+|@\S+|https?://\S+)").unwrap());
static RE_MULTISPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

#[inline]
fn is_emoji(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c)
}

/// Trim every line, drop empties, rejoin with `\n`.
pub fn clean_lines(text: &str) -> String {
    text.replace('\r', "")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove hashtags, mentions and links from every line. The trailing zone
/// (link line, hashtag line) is assembled later from clean parts, so body
/// lines must end up free of all three.
pub fn strip_forbidden(text: &str) -> String {
    let stripped = text
        .lines()
        .map(|l| RE_FORBIDDEN.replace_all(l, "").trim().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    clean_lines(&RE_MULTISPACE.replace_all(&stripped, " "))
}

/// Clip each line to at most `max_words` whitespace-separated words.
pub fn limit_words_per_line(text: &str, max_words: usize) -> String {
    text.lines()
        .map(|l| {
            let words: Vec<&str> = l.split_whitespace().collect();
            if words.len() > max_words {
                words[..max_words].join(" ")
            } else {
                l.trim().to_string()
            }
        })
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop trailing lines beyond `max_lines`. Never pads.
pub fn enforce_line_count(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[..lines.len().min(max_lines)].join("\n")
}

pub fn emoji_count(text: &str) -> usize {
    text.chars().filter(|c| is_emoji(*c)).count()
}

/// Remove excess emoji scanning left to right until at most `max` remain
/// (the trailing ones survive, which is where the templates place them).
pub fn limit_emojis(text: &str, max: usize) -> String {
    let mut excess = emoji_count(text).saturating_sub(max);
    if excess == 0 {
        return text.to_string();
    }
    text.chars()
        .filter(|c| {
            if excess > 0 && is_emoji(*c) {
                excess -= 1;
                false
            } else {
                true
            }
        })
        .collect()
}

/// Append one emoji to line 2 when sanitization stripped them all.
pub fn ensure_emoji_on_second_line(text: &str) -> String {
    if emoji_count(text) > 0 {
        return text.to_string();
    }
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.len() >= 2 {
        lines[1].push_str(" 😤");
    }
    lines.join("\n")
}

/// Wrap the body in one pair of ASCII double quotes, normalizing any
/// typographic quotes already present so the result never doubles up.
pub fn wrap_in_quotes(body: &str) -> String {
    let mut t = body
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .trim()
        .to_string();
    if !t.starts_with('"') {
        t.insert(0, '"');
    }
    if !t.ends_with('"') || t.len() == 1 {
        t.push('"');
    }
    t
}

/// Split a single long paragraph into up to `max_lines` lines on sentence
/// enders (।, !, ?). Generators occasionally ignore the line-format
/// instruction and return prose.
pub fn split_paragraph(text: &str, max_lines: usize) -> String {
    if text.contains('\n') || text.chars().count() <= 100 {
        return text.to_string();
    }
    static RE_SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[।!?]\s+").unwrap());
    let parts: Vec<&str> = RE_SENTENCE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() >= 3 {
        parts[..parts.len().min(max_lines)].join("\n")
    } else {
        text.to_string()
    }
}

/// Enforce the global character budget. The trailing zone (link line and/or
/// hashtag line) survives intact when it ends with a link; otherwise the
/// text is hard-truncated from the end.
pub fn enforce_char_budget(text: &str, budget: usize) -> String {
    let t = text.trim();
    if t.chars().count() <= budget {
        return t.to_string();
    }
    let lines: Vec<&str> = t.lines().collect();
    // Preserve everything from the link line onward, trim the body to fit.
    if let Some(link_idx) = lines
        .iter()
        .position(|l| l.contains("http://") || l.contains("https://"))
    {
        let tail = lines[link_idx..].join("\n");
        let tail_len = tail.chars().count();
        let body = lines[..link_idx].join("\n");
        let keep = budget.saturating_sub(tail_len + 1);
        let clipped: String = body.chars().take(keep).collect();
        let joined = format!("{}\n{}", clipped.trim_end(), tail);
        return joined.trim().chars().take(budget).collect();
    }
    t.chars().take(budget).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_tokens_are_stripped_per_line() {
        let s = "सड़क खराब है #roads\n@minister जवाब दो\nlink: https://x.co/a देखो";
        let out = strip_forbidden(s);
        assert!(!out.contains('#'));
        assert!(!out.contains('@'));
        assert!(!out.contains("http"));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn word_limit_clips_long_lines() {
        let line = (0..20).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let out = limit_words_per_line(&line, 12);
        assert_eq!(out.split_whitespace().count(), 12);
    }

    #[test]
    fn line_count_drops_trailing_excess() {
        let out = enforce_line_count("a\nb\nc\nd\ne\nf", 4);
        assert_eq!(out, "a\nb\nc\nd");
        // never pads
        assert_eq!(enforce_line_count("a", 4), "a");
    }

    #[test]
    fn emoji_cap_keeps_trailing_two() {
        let s = "😭 one 😤 two 😅 three";
        let out = limit_emojis(s, 2);
        assert_eq!(emoji_count(&out), 2);
        assert!(!out.contains('😭'), "leftmost emoji should be dropped first");
        assert!(out.contains('😅'));
    }

    #[test]
    fn quote_wrap_never_doubles() {
        assert_eq!(wrap_in_quotes("line"), "\"line\"");
        assert_eq!(wrap_in_quotes("\"line\""), "\"line\"");
        assert_eq!(wrap_in_quotes("\u{201C}line\u{201D}"), "\"line\"");
    }

    #[test]
    fn paragraph_splits_on_sentence_enders() {
        let s = "चांद पर मिशन चल रहा है और बजट वहीं जा रहा है। सड़क पर गड्ढे वैसे ही हैं! \
नगर निगम सो रहा है? जनता परेशान है।";
        let out = split_paragraph(s, 4);
        assert!(out.lines().count() >= 3, "got: {out}");
    }

    #[test]
    fn budget_preserves_link_line() {
        let body = "ल".repeat(300);
        let text = format!("{body}\n🔗 https://example.com/article");
        let out = enforce_char_budget(&text, 280);
        assert!(out.chars().count() <= 280);
        assert!(out.ends_with("https://example.com/article"));
    }

    #[test]
    fn budget_hard_truncates_without_link() {
        let out = enforce_char_budget(&"x".repeat(400), 280);
        assert_eq!(out.chars().count(), 280);
    }
}
