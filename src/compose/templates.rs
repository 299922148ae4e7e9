//! Tonal modes and their prompt templates.
//!
//! One lookup table `Mode -> Template` instead of scattered literals: the
//! composer stays pure given its inputs, and a mode's structure/temperature
//! can be tuned in one place.

use serde::{Deserialize, Serialize};

/// Tonal register for a post. `Upbeat` is the default meme register;
/// sensitive topics are forced into `Cautious` or `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Upbeat,
    Cautious,
    Neutral,
}

impl Mode {
    pub fn template(self) -> &'static Template {
        match self {
            Mode::Upbeat => &UPBEAT,
            Mode::Cautious => &CAUTIOUS,
            Mode::Neutral => &NEUTRAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Upbeat => "upbeat",
            Mode::Cautious => "cautious",
            Mode::Neutral => "neutral",
        }
    }
}

/// Structural template for one mode: style instructions prepended to the
/// user prompt, plus sampling knobs.
pub struct Template {
    pub style: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Shared system prompt for body generation: fixes the 3–4 line shape,
/// Hinglish register, and the no-hashtag/no-link rule at the source.
pub const BODY_SYSTEM: &str = "तुम एक SHARP Gen-Z Hindi news writer हो। \
हमेशा 3-4 छोटी lines लिखो, हर line 8-12 शब्द। \
Line 1: concrete observation (numbers/facts)। \
Line 2: claim vs ground reality का contrast। \
Line 3: असली असर या ironic consequence। \
Line 4: छोटा sharp closing (optional)। \
भाषा: Hindi (Devanagari) + natural English words (system, budget, launch, reality)। \
Numbers हमेशा English में (1, 2, 3)। \
कोई hashtag, @mention या link मत लिखो। सिर्फ lines, कोई extra commentary नहीं।";

static UPBEAT: Template = Template {
    style: "Tone: मीम-वाइब, तीखा sarcasm, relatable। \
'X कर रहा है, Y सो रहा है' जैसे patterns use करो। \
1-2 emoji (😭😤😅🤡💀), line 2 या 3 में। \
Generic मत बनो, हर line में concrete detail + sarcasm।",
    temperature: 0.70,
    max_tokens: 180,
};

static CAUTIOUS: Template = Template {
    style: "Tone: जवाबदेही, no jokes। \
Line 1: concrete failure/problem। \
Line 2: authority का claim vs reality। \
Line 3: सीधा सवाल - किसकी जिम्मेदारी? \
Line 4: आम लोगों का सच। \
Emoji: 1 max, कोई मज़ाक नहीं, सिर्फ sharp direct सवाल।",
    temperature: 0.55,
    max_tokens: 180,
};

static NEUTRAL: Template = Template {
    style: "Tone: calm, factual, बिना drama। \
Facts, numbers और ground reality। कोई sarcasm नहीं। \
Emoji: 0-1 only। Thought-provoking पर respectful।",
    temperature: 0.45,
    max_tokens: 180,
};

/// System prompt for the translation step (English topic → concise Hinglish
/// core line).
pub const TRANSLATE_SYSTEM: &str = "You are a Gen-Z Hindi translator. \
Write MOSTLY in Hindi (Devanagari). \
Use natural English words only when needed (system, budget, launch, mission, \
pollution, AQI, development, reality). \
Use English numerals (1, 2, 3). One concise line only.";

/// User-prompt prefix for the translation step; the raw topic follows.
pub const TRANSLATE_PREFIX: &str = "इस वाक्य को simple, concrete Hindi में बदलो \
(Gen-Z टच चलेगा)। Over-dramatic नहीं, crisp रखो। Numbers English में: 1, 2, 3। \
केवल अनुवाद दो, कुछ और नहीं।\n\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_template() {
        for m in [Mode::Upbeat, Mode::Cautious, Mode::Neutral] {
            let t = m.template();
            assert!(!t.style.is_empty());
            assert!(t.temperature > 0.0 && t.temperature < 1.0);
            assert!(t.max_tokens > 0);
        }
    }

    #[test]
    fn serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Upbeat).unwrap(), "\"upbeat\"");
        assert_eq!(
            serde_json::from_str::<Mode>("\"cautious\"").unwrap(),
            Mode::Cautious
        );
    }
}
