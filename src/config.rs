//! Process configuration: one explicit struct built from the environment at
//! startup and passed down. No component reads the environment after boot,
//! which keeps tests deterministic without env juggling.

use std::path::PathBuf;

use crate::gate::QuotaLimits;

#[derive(Debug, Clone)]
pub struct Limits {
    pub daily: u32,
    pub monthly: u32,
}

#[derive(Debug, Clone)]
pub struct Safety {
    /// Suppress meme decoration for sensitive topics (mode override itself
    /// is unconditional).
    pub avoid_sensitive_humor: bool,
    /// When a sensitive topic forces a mode change, allow the
    /// accountability register instead of plain neutral.
    pub critique_authorities: bool,
}

#[derive(Debug, Clone)]
pub struct Hashtags {
    pub enabled: bool,
    pub max_count: usize,
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub use_memes: bool,
    pub trends_per_window: u32,
}

#[derive(Debug, Clone)]
pub struct News {
    pub country: String,
    pub gnews_key: String,
    pub newsapi_key: String,
    /// Headlines requested per cache run, whichever provider answers.
    pub fetch_limit: u32,
}

#[derive(Debug, Clone)]
pub struct Llm {
    pub groq_api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct XApi {
    pub bearer_token: String,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub limits: Limits,
    pub safety: Safety,
    pub hashtags: Hashtags,
    pub posting: Posting,
    pub news: News,
    pub llm: Llm,
    pub x_api: XApi,
    pub db_path: PathBuf,
    /// Dry-run: the publish step simulates success without calling X.
    pub test_mode: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            limits: Limits {
                daily: 15,
                monthly: 450,
            },
            safety: Safety {
                avoid_sensitive_humor: true,
                critique_authorities: true,
            },
            hashtags: Hashtags {
                enabled: true,
                max_count: 2,
            },
            posting: Posting {
                use_memes: true,
                trends_per_window: 1,
            },
            news: News {
                country: "in".to_string(),
                gnews_key: String::new(),
                newsapi_key: String::new(),
                fetch_limit: 20,
            },
            llm: Llm {
                groq_api_key: String::new(),
                model: "llama-3.1-8b-instant".to_string(),
            },
            x_api: XApi {
                bearer_token: String::new(),
            },
            db_path: PathBuf::from("bot.sqlite3"),
            test_mode: false,
        }
    }
}

impl BotConfig {
    /// Build from the environment, falling back to defaults per field.
    /// Call once in `main`, after `dotenvy`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            limits: Limits {
                daily: env_parse("DAILY_TWEET_LIMIT", d.limits.daily),
                monthly: env_parse("MONTHLY_TWEET_LIMIT", d.limits.monthly),
            },
            safety: Safety {
                avoid_sensitive_humor: env_bool("AVOID_SENSITIVE_HUMOR", true),
                critique_authorities: env_bool("CRITIQUE_AUTHORITIES", true),
            },
            hashtags: Hashtags {
                enabled: env_bool("HASHTAGS_ENABLED", true),
                max_count: env_parse("HASHTAGS_MAX", d.hashtags.max_count),
            },
            posting: Posting {
                use_memes: env_bool("USE_MEMES", true),
                trends_per_window: env_parse("TRENDS_PER_WINDOW", d.posting.trends_per_window),
            },
            news: News {
                country: env_string("DEFAULT_COUNTRY", &d.news.country),
                gnews_key: env_string("GNEWS_API_KEY", ""),
                newsapi_key: env_string("NEWSAPI_KEY", ""),
                fetch_limit: env_parse("NEWS_FETCH_LIMIT", d.news.fetch_limit),
            },
            llm: Llm {
                groq_api_key: env_string("GROQ_API_KEY", ""),
                model: env_string("LLM_MODEL", &d.llm.model),
            },
            x_api: XApi {
                bearer_token: env_string("X_BEARER_TOKEN", ""),
            },
            db_path: PathBuf::from(env_string("DB_PATH", "bot.sqlite3")),
            test_mode: env_bool("TEST_MODE", false),
        }
    }

    pub fn quota_limits(&self) -> QuotaLimits {
        QuotaLimits {
            daily: self.limits.daily,
            monthly: self.limits.monthly,
        }
    }

    pub fn composer_settings(&self) -> crate::compose::ComposerSettings {
        crate::compose::ComposerSettings {
            hashtags_enabled: self.hashtags.enabled,
            max_hashtags: self.hashtags.max_count,
            critique_authorities: self.safety.critique_authorities,
            ..Default::default()
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
