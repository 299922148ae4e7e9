//! Run sequencing: fetch → compose → gate → publish → record, once per
//! trigger invocation.
//!
//! Policy: one gated attempt per candidate, no retry inside a run. A denied
//! gate or a refused publish ends the run early instead of burning through
//! more candidates; repeated failures must not turn into a posting flood.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use crate::compose::{ComposedPost, Composer};
use crate::config::BotConfig;
use crate::gate::{self, GateOutcome};
use crate::publish::Publisher;
use crate::render::MemeRenderer;
use crate::sources::{fetch_first_available, NewsProvider};
use crate::store::{fingerprint, CachedItem, NewPostRecord, Store};

/// One-time metrics registration (so series show up on a recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("posts_published_total", "Posts accepted by the platform.");
        describe_counter!("posts_simulated_total", "Dry-run posts recorded as simulated.");
        describe_counter!("gate_denied_total", "Gate denials (duplicate or quota).");
        describe_counter!("publish_failed_total", "Publish attempts refused or errored.");
        describe_counter!("compose_fallback_total", "Bodies that fell back to the core text.");
        describe_counter!("fetch_items_total", "Candidate items fetched from providers.");
        describe_counter!("fetch_provider_errors_total", "Provider fetch/parse errors.");
        describe_counter!("news_cached_total", "News items written to the staging cache.");
    });
}

/// Result of one gated publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAttempt {
    /// Accepted by the platform; carries the external post id.
    Published(String),
    /// Dry-run: recorded in history without calling the platform.
    Simulated,
    /// Gate denial or publish failure; nothing was recorded.
    Skipped,
}

pub struct Orchestrator {
    store: Store,
    composer: Composer,
    publisher: Arc<dyn Publisher>,
    renderer: Arc<dyn MemeRenderer>,
    trends: Box<dyn NewsProvider>,
    news: Vec<Box<dyn NewsProvider>>,
    config: BotConfig,
}

impl Orchestrator {
    pub fn new(
        store: Store,
        composer: Composer,
        publisher: Arc<dyn Publisher>,
        renderer: Arc<dyn MemeRenderer>,
        trends: Box<dyn NewsProvider>,
        news: Vec<Box<dyn NewsProvider>>,
        config: BotConfig,
    ) -> Self {
        ensure_metrics_described();
        Self {
            store,
            composer,
            publisher,
            renderer,
            trends,
            news,
            config,
        }
    }

    /// Trigger: compose and post from the trending feed.
    pub async fn run_trend_window(&self) -> Result<()> {
        info!("fetching trending topics");
        let topics = match self.trends.fetch(self.config.posting.trends_per_window).await {
            Ok(t) => t,
            Err(e) => {
                error!(error = ?e, "trend fetch failed, ending run");
                counter!("fetch_provider_errors_total").increment(1);
                return Ok(());
            }
        };
        if topics.is_empty() {
            warn!("no trending topics available");
            return Ok(());
        }

        for topic in &topics {
            // Trend posts carry no origin link; the headline is the story.
            let (post, use_meme) = self.compose_for_topic(&topic.title, None).await;
            let attempt = self
                .post_one(&post, self.trends.name(), None, use_meme)
                .await?;
            if attempt == PostAttempt::Skipped {
                break;
            }
        }
        Ok(())
    }

    /// Trigger: fetch headlines through the provider fallback chain and
    /// stage them in the cache. No composition, no posting.
    pub async fn cache_news_batch(&self) -> Result<()> {
        info!("caching news headlines");
        let Some((source, items)) =
            fetch_first_available(&self.news, self.config.news.fetch_limit).await
        else {
            warn!("every news provider failed, ending run");
            return Ok(());
        };

        let mut cached = 0u64;
        for item in &items {
            let fp = fingerprint(&[&item.title, &item.description, &item.url]);
            self.store
                .cache_item(
                    &CachedItem {
                        fingerprint: fp,
                        title: item.title.clone(),
                        description: item.description.clone(),
                        url: item.url.clone(),
                        source: source.to_string(),
                    },
                    Utc::now(),
                )
                .await?;
            cached += 1;
        }
        counter!("news_cached_total").increment(cached);
        info!(count = cached, source, "news items cached");
        Ok(())
    }

    /// Trigger: compose and post from the staged news cache.
    pub async fn run_news_batch(&self, count: u32) -> Result<()> {
        info!(count, "posting from news cache");
        let rows = self.store.select_cached(50).await?;
        if rows.is_empty() {
            warn!("news cache is empty");
            return Ok(());
        }

        let mut posted = 0u32;
        for item in &rows {
            if posted >= count {
                break;
            }
            let raw = if item.description.is_empty() {
                item.title.clone()
            } else {
                format!("{} — {}", item.title, item.description)
            };
            let (post, use_meme) = self.compose_for_topic(&raw, Some(&item.url)).await;
            let attempt = self
                .post_one(&post, &item.source, none_if_empty(&item.url), use_meme)
                .await?;
            match attempt {
                PostAttempt::Published(_) | PostAttempt::Simulated => posted += 1,
                PostAttempt::Skipped => break,
            }
        }
        info!(posted, "news batch finished");
        Ok(())
    }

    /// Compose a post for one topic and decide meme usage. Meme decoration
    /// is dropped for sensitive topics when the safety flag says so.
    async fn compose_for_topic(&self, topic: &str, url: Option<&str>) -> (ComposedPost, bool) {
        let post = self
            .composer
            .compose(topic, url, None, Some(topic))
            .await;
        let use_meme = self.config.posting.use_memes
            && !(post.sensitive && self.config.safety.avoid_sensitive_humor);
        if post.sensitive {
            info!(mode = post.mode.as_str(), "sensitive topic, posting responsibly");
        }
        (post, use_meme)
    }

    /// One gated attempt: fingerprint → gate → publish (or simulate) →
    /// record. Failed publishes are not recorded and not retried.
    pub async fn post_one(
        &self,
        post: &ComposedPost,
        source: &str,
        url: Option<&str>,
        use_meme: bool,
    ) -> Result<PostAttempt> {
        let url = url.unwrap_or_default();
        let fp = fingerprint(&[post.text.as_str(), url, source]);

        match gate::check(&self.store, &fp, self.config.quota_limits(), Utc::now()).await? {
            GateOutcome::DeniedDuplicate => {
                info!(source, "duplicate, skipping");
                counter!("gate_denied_total").increment(1);
                return Ok(PostAttempt::Skipped);
            }
            GateOutcome::DeniedQuota { kind } => {
                warn!(?kind, "quota reached, skipping");
                counter!("gate_denied_total").increment(1);
                return Ok(PostAttempt::Skipped);
            }
            GateOutcome::Allowed {
                daily_used,
                monthly_used,
            } => {
                info!(daily_used, monthly_used, "posting allowed");
            }
        }

        if self.config.test_mode {
            info!(text = %post.text, "[test mode] simulated post");
            self.record(&fp, post, source, url, None, None).await?;
            counter!("posts_simulated_total").increment(1);
            return Ok(PostAttempt::Simulated);
        }

        let (published, media_ref) = if use_meme {
            match self.renderer.render(&post.text) {
                Ok((path, media_hash)) => (
                    self.publisher.publish_with_media(&post.text, &path).await,
                    Some(media_hash),
                ),
                Err(e) => {
                    warn!(error = ?e, "meme render failed, posting text only");
                    (self.publisher.publish_text(&post.text).await, None)
                }
            }
        } else {
            (self.publisher.publish_text(&post.text).await, None)
        };

        let external_id = match published {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(source, "publish refused, abandoning attempt");
                counter!("publish_failed_total").increment(1);
                return Ok(PostAttempt::Skipped);
            }
            Err(e) => {
                warn!(error = ?e, source, "publish failed, abandoning attempt");
                counter!("publish_failed_total").increment(1);
                return Ok(PostAttempt::Skipped);
            }
        };

        self.record(&fp, post, source, url, media_ref, Some(external_id.clone()))
            .await?;
        counter!("posts_published_total").increment(1);
        info!(id = %external_id, source, "posted");
        Ok(PostAttempt::Published(external_id))
    }

    async fn record(
        &self,
        fp: &str,
        post: &ComposedPost,
        source: &str,
        url: &str,
        media_ref: Option<String>,
        external_id: Option<String>,
    ) -> Result<()> {
        self.store
            .record_posted(&NewPostRecord {
                fingerprint: fp.to_string(),
                text: post.text.clone(),
                source: source.to_string(),
                url: url.to_string(),
                media_ref,
                posted_at: Utc::now(),
                external_id,
            })
            .await
    }
}

fn none_if_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
