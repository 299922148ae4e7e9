//! GNews top-headlines provider (JSON API).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{CandidateItem, NewsProvider};

#[derive(Debug, Deserialize)]
struct Resp {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

pub struct GNewsProvider {
    http: reqwest::Client,
    api_key: String,
    country: String,
}

impl GNewsProvider {
    pub fn new(api_key: impl Into<String>, country: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("hinglish-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.into(),
            country: country.into(),
        }
    }
}

#[async_trait]
impl NewsProvider for GNewsProvider {
    async fn fetch(&self, limit: u32) -> Result<Vec<CandidateItem>> {
        if self.api_key.is_empty() {
            bail!("missing GNews API key");
        }
        let url = format!(
            "https://gnews.io/api/v4/top-headlines?country={}&max={}&apikey={}&lang=en",
            self.country, limit, self.api_key
        );
        let resp: Resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("fetching gnews headlines")?
            .error_for_status()
            .context("gnews status")?
            .json()
            .await
            .context("decoding gnews response")?;

        Ok(resp
            .articles
            .into_iter()
            .take(limit as usize)
            .map(|a| CandidateItem {
                title: a.title.unwrap_or_default(),
                description: a.description.unwrap_or_default(),
                url: a.url.unwrap_or_default(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "gnews"
    }
}
