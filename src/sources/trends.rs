//! Trending topics via the Google News Hindi RSS feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use super::{CandidateItem, NewsProvider};
use crate::normalize::clean_topic;

const DEFAULT_FEED: &str = "https://news.google.com/rss?hl=hi-IN&gl=IN&ceid=IN:hi";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

/// Parse feed XML into candidates, newest first. Separated from HTTP so
/// fixtures can drive it in tests.
pub fn parse_feed(xml: &str, limit: u32) -> Result<Vec<CandidateItem>> {
    let rss: Rss = from_str(xml).context("parsing trends rss xml")?;
    let mut items: Vec<(u64, CandidateItem)> = rss
        .channel
        .item
        .into_iter()
        .filter_map(|it| {
            let title = clean_topic(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                return None;
            }
            let published = it
                .pub_date
                .as_deref()
                .map(parse_rfc2822_to_unix)
                .unwrap_or(0);
            Some((
                published,
                CandidateItem {
                    title,
                    description: String::new(),
                    url: it.link.unwrap_or_default(),
                },
            ))
        })
        .collect();

    items.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(items
        .into_iter()
        .take(limit as usize)
        .map(|(_, c)| c)
        .collect())
}

pub struct GoogleTrendsProvider {
    http: reqwest::Client,
    feed_url: String,
}

impl GoogleTrendsProvider {
    pub fn new() -> Self {
        Self::with_feed(DEFAULT_FEED)
    }

    pub fn with_feed(feed_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("hinglish-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            feed_url: feed_url.into(),
        }
    }
}

impl Default for GoogleTrendsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsProvider for GoogleTrendsProvider {
    async fn fetch(&self, limit: u32) -> Result<Vec<CandidateItem>> {
        let body = self
            .http
            .get(&self.feed_url)
            .send()
            .await
            .context("fetching trends feed")?
            .error_for_status()
            .context("trends feed status")?
            .text()
            .await
            .context("reading trends feed body")?;
        parse_feed(&body, limit)
    }

    fn name(&self) -> &'static str {
        "trend_hi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>Google News (hi-IN)</title>
  <item>
    <title>लोकल ट्रेन में भीड़ &amp; bullet train का ऐलान</title>
    <link>https://news.example/a</link>
    <pubDate>Sat, 16 Aug 2025 10:00:00 GMT</pubDate>
  </item>
  <item>
    <title>  मानसून   अपडेट </title>
    <link>https://news.example/b</link>
    <pubDate>Sat, 16 Aug 2025 12:00:00 GMT</pubDate>
  </item>
  <item>
    <title></title>
    <link>https://news.example/empty</link>
  </item>
</channel></rss>"#;

    #[test]
    fn parses_cleans_and_orders_newest_first() {
        let items = parse_feed(FIXTURE, 10).unwrap();
        assert_eq!(items.len(), 2, "empty titles are dropped");
        assert_eq!(items[0].title, "मानसून अपडेट");
        assert_eq!(items[1].title, "लोकल ट्रेन में भीड़ & bullet train का ऐलान");
        assert_eq!(items[0].url, "https://news.example/b");
    }

    #[test]
    fn limit_is_honored() {
        let items = parse_feed(FIXTURE, 1).unwrap();
        assert_eq!(items.len(), 1);
    }
}
