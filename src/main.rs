//! Binary entrypoint: parse the trigger, wire collaborators, run once.
//!
//! The bot is externally scheduled; every invocation performs exactly one
//! trigger's worth of work and exits.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hinglish_news_bot::compose::Composer;
use hinglish_news_bot::config::BotConfig;
use hinglish_news_bot::llm::{DisabledGenerator, GroqGenerator, TextGenerator};
use hinglish_news_bot::orchestrator::Orchestrator;
use hinglish_news_bot::publish::{Publisher, XApiPublisher};
use hinglish_news_bot::render::{DisabledRenderer, MemeRenderer};
use hinglish_news_bot::sources::gnews::GNewsProvider;
use hinglish_news_bot::sources::newsapi::NewsApiProvider;
use hinglish_news_bot::sources::trends::GoogleTrendsProvider;
use hinglish_news_bot::sources::NewsProvider;
use hinglish_news_bot::store::Store;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Trigger {
    /// Compose and post from the trending feed.
    TrendWindow,
    /// Fetch headlines and stage them in the cache.
    CacheNews,
    /// Compose and post from the staged news cache.
    NewsBatch,
}

#[derive(Parser)]
#[command(name = "hinglish-news-bot", about = "Hinglish Gen-Z news bot for X")]
struct Cli {
    /// What this invocation should do.
    #[arg(value_enum)]
    trigger: Trigger,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = BotConfig::from_env();

    let store = Store::open(&config.db_path).await?;

    let generator: Arc<dyn TextGenerator> = if config.llm.groq_api_key.is_empty() {
        warn!("GROQ_API_KEY not set, text generation disabled (raw topics will be posted)");
        Arc::new(DisabledGenerator)
    } else {
        Arc::new(GroqGenerator::new(
            &config.llm.groq_api_key,
            &config.llm.model,
        ))
    };
    let composer = Composer::new(generator, config.composer_settings());

    let publisher: Arc<dyn Publisher> = Arc::new(XApiPublisher::new(&config.x_api.bearer_token));
    let renderer: Arc<dyn MemeRenderer> = Arc::new(DisabledRenderer);

    let trends: Box<dyn NewsProvider> = Box::new(GoogleTrendsProvider::new());
    let news: Vec<Box<dyn NewsProvider>> = vec![
        Box::new(GNewsProvider::new(
            &config.news.gnews_key,
            &config.news.country,
        )),
        Box::new(NewsApiProvider::new(
            &config.news.newsapi_key,
            &config.news.country,
        )),
    ];

    let trigger = cli.trigger;
    let orchestrator =
        Orchestrator::new(store, composer, publisher, renderer, trends, news, config);

    match trigger {
        Trigger::TrendWindow => orchestrator.run_trend_window().await,
        Trigger::CacheNews => orchestrator.cache_news_batch().await,
        Trigger::NewsBatch => orchestrator.run_news_batch(1).await,
    }
}
