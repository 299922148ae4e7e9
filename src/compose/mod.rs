//! Style selection and post composition.
//!
//! Takes a raw topic and produces the final publishable text: translate to
//! the target script if needed, resolve the tonal mode (sensitive topics are
//! never rendered upbeat), generate a multi-line body, sanitize it through a
//! fixed pipeline, then assemble quotes + link line + hashtags under the
//! global character budget.
//!
//! Generator failures never escape: every call degrades to the translated
//! (or raw) core text.

pub mod hashtag;
pub mod sanitize;
pub mod templates;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::llm::TextGenerator;
use crate::normalize::{
    contains_devanagari, devanagari_fraction, mask_profanity, normalize_numerals,
};
use crate::sensitivity::is_sensitive;
use templates::{Mode, BODY_SYSTEM, TRANSLATE_PREFIX, TRANSLATE_SYSTEM};

/// Returned for empty/whitespace-only topics; the pipeline is skipped.
pub const EMPTY_TOPIC_PLACEHOLDER: &str = "⚠ अरे भाई, विषय तो दे दो! 😅";

/// Input text at or above this Devanagari share skips the translation call.
const ALREADY_TARGET_FRACTION: f32 = 0.8;
/// A translation below this share is treated as a weak result and discarded.
const ACCEPT_TARGET_FRACTION: f32 = 0.5;

/// Line/emoji/length constraints plus decoration policy. Built from
/// [`crate::config::BotConfig`]; defaults match the production values.
#[derive(Debug, Clone)]
pub struct ComposerSettings {
    pub min_lines: usize,
    pub max_lines: usize,
    pub max_words_per_line: usize,
    pub max_emoji: usize,
    pub char_budget: usize,
    pub hashtags_enabled: bool,
    pub max_hashtags: usize,
    /// When a sensitive topic forces a mode change, allowed authority
    /// critique picks `Cautious`; otherwise `Neutral`.
    pub critique_authorities: bool,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            min_lines: 3,
            max_lines: 4,
            max_words_per_line: 12,
            max_emoji: 2,
            char_budget: 280,
            hashtags_enabled: true,
            max_hashtags: 2,
            critique_authorities: true,
        }
    }
}

/// Final text plus the decisions that shaped it. The orchestrator needs
/// `sensitive` for meme suppression and `mode` for logging.
#[derive(Debug, Clone)]
pub struct ComposedPost {
    pub text: String,
    pub mode: Mode,
    pub sensitive: bool,
}

pub struct Composer {
    generator: Arc<dyn TextGenerator>,
    settings: ComposerSettings,
}

impl Composer {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: ComposerSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// Compose the final post for one topic.
    ///
    /// `mode` is the caller's request (defaults to [`Mode::Upbeat`]);
    /// sensitive topics override it. `hashtag_source` feeds the trailing
    /// hashtag zone and is ignored for sensitive topics.
    pub async fn compose(
        &self,
        topic: &str,
        link: Option<&str>,
        mode: Option<Mode>,
        hashtag_source: Option<&str>,
    ) -> ComposedPost {
        let requested = mode.unwrap_or(Mode::Upbeat);
        if topic.trim().is_empty() {
            return ComposedPost {
                text: EMPTY_TOPIC_PLACEHOLDER.to_string(),
                mode: requested,
                sensitive: false,
            };
        }

        // 1) Bring the topic into the target script.
        let core = self.translate_to_hindi(topic).await;

        // 2) Resolve the effective mode.
        let sensitive = is_sensitive(&core);
        let effective = resolve_mode(requested, sensitive, self.settings.critique_authorities);
        if effective != requested {
            info!(
                requested = requested.as_str(),
                effective = effective.as_str(),
                "sensitive topic, overriding mode"
            );
        }

        // 3) Generate + sanitize the body; weak output falls back to `core`.
        let body = self.generate_body(&core, effective, sensitive).await;

        // 4) Assemble quotes, link line, hashtag line.
        let mut text = sanitize::wrap_in_quotes(&body);
        if let Some(url) = link.filter(|u| !u.trim().is_empty()) {
            text.push_str(&format!("\n🔗 {}", url.trim()));
        }
        if let Some(src) = hashtag_source {
            if !sensitive && self.settings.hashtags_enabled {
                if let Some(tags) = self.derive_hashtags(src).await {
                    debug!(%tags, "appending hashtags");
                    text.push('\n');
                    text.push_str(&tags);
                }
            }
        }

        // 5) Global character budget, numerals last.
        let text =
            normalize_numerals(&sanitize::enforce_char_budget(&text, self.settings.char_budget));

        ComposedPost {
            text,
            mode: effective,
            sensitive,
        }
    }

    /// Translate to Hinglish when needed. Weak or failed results fall back
    /// to the raw input.
    async fn translate_to_hindi(&self, text: &str) -> String {
        let trimmed = text.trim();
        if devanagari_fraction(trimmed) >= ALREADY_TARGET_FRACTION {
            return normalize_numerals(trimmed);
        }

        let prompt = format!("{TRANSLATE_PREFIX}{trimmed}");
        let result = self
            .generator
            .generate(TRANSLATE_SYSTEM, &prompt, 0.4, 120)
            .await
            .unwrap_or_else(|e| {
                warn!(error = ?e, "translation call failed");
                String::new()
            });

        let result = result.trim();
        if contains_devanagari(result) && devanagari_fraction(result) >= ACCEPT_TARGET_FRACTION {
            normalize_numerals(result)
        } else {
            debug!("weak translation, keeping original topic");
            trimmed.to_string()
        }
    }

    /// Generate the multi-line body and run the sanitation pipeline in its
    /// fixed order. Any failure path ends at the single-line `core` fallback.
    async fn generate_body(&self, core: &str, mode: Mode, sensitive: bool) -> String {
        let template = mode.template();
        let user = format!(
            "{style}\n\n📰 TOPIC:\n{core}\n\nअब इस topic पर {min}-{max} lines लिखो, \
हर line {words} शब्द से छोटी। सिर्फ lines, कोई extra commentary नहीं।",
            style = template.style,
            min = self.settings.min_lines,
            max = self.settings.max_lines,
            words = self.settings.max_words_per_line,
        );

        let raw = self
            .generator
            .generate(BODY_SYSTEM, &user, template.temperature, template.max_tokens)
            .await
            .unwrap_or_else(|e| {
                warn!(error = ?e, "body generation failed");
                String::new()
            });

        if raw.trim().is_empty() {
            metrics::counter!("compose_fallback_total").increment(1);
            return finish_body(core);
        }

        let text = sanitize::clean_lines(&raw);
        let text = sanitize::split_paragraph(&text, self.settings.max_lines);
        let text = sanitize::strip_forbidden(&text);
        let text = sanitize::limit_words_per_line(&text, self.settings.max_words_per_line);
        let text = sanitize::enforce_line_count(&text, self.settings.max_lines);

        if text.lines().count() < self.settings.min_lines {
            // Too little survived sanitization; the core line is safer than
            // a half-shaped body.
            metrics::counter!("compose_fallback_total").increment(1);
            return finish_body(core);
        }

        let text = sanitize::limit_emojis(&text, self.settings.max_emoji);
        let text = finish_body(&text);
        if sensitive {
            text
        } else {
            sanitize::ensure_emoji_on_second_line(&text)
        }
    }

    /// Hashtag sources go through the same translation step so English feed
    /// titles still produce Devanagari tags.
    async fn derive_hashtags(&self, source: &str) -> Option<String> {
        if source.trim().is_empty() {
            return None;
        }
        let hindi = self.translate_to_hindi(source).await;
        if !contains_devanagari(&hindi) {
            return None;
        }
        hashtag::hashtagify(&hindi, self.settings.max_hashtags)
    }
}

/// Shared tail of the sanitation pipeline: masking and numerals apply to
/// generated bodies and fallback cores alike.
fn finish_body(text: &str) -> String {
    normalize_numerals(&mask_profanity(text))
}

/// Sensitive topics are never rendered upbeat: the override picks the
/// accountability register when authority critique is allowed, otherwise the
/// plain factual one. Explicit cautious/neutral requests pass through.
pub fn resolve_mode(requested: Mode, sensitive: bool, critique_authorities: bool) -> Mode {
    if sensitive && requested == Mode::Upbeat {
        if critique_authorities {
            Mode::Cautious
        } else {
            Mode::Neutral
        }
    } else {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_resolution_table() {
        assert_eq!(resolve_mode(Mode::Upbeat, false, true), Mode::Upbeat);
        assert_eq!(resolve_mode(Mode::Upbeat, true, true), Mode::Cautious);
        assert_eq!(resolve_mode(Mode::Upbeat, true, false), Mode::Neutral);
        // explicit non-upbeat requests are honored even for sensitive topics
        assert_eq!(resolve_mode(Mode::Neutral, true, true), Mode::Neutral);
        assert_eq!(resolve_mode(Mode::Cautious, false, true), Mode::Cautious);
    }
}
