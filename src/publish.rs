//! Publish collaborator: X (Twitter) v2 client + test double.
//!
//! `Ok(None)` means the platform refused the post (no id came back); the
//! orchestrator abandons the attempt without writing history. Transport
//! errors surface as `Err` and are handled the same way upstream.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

const TWEETS_ENDPOINT: &str = "https://api.x.com/2/tweets";
const MEDIA_UPLOAD_ENDPOINT: &str = "https://upload.twitter.com/1.1/media/upload.json";

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Text-only post. Returns the external post id, or `None` if the
    /// platform refused it.
    async fn publish_text(&self, text: &str) -> Result<Option<String>>;

    /// Post with an attached image.
    async fn publish_with_media(&self, text: &str, image: &Path) -> Result<Option<String>>;

    fn name(&self) -> &'static str;
}

/// X v2 client (OAuth 2.0 user-context bearer token).
#[derive(Clone)]
pub struct XApiPublisher {
    http: reqwest::Client,
    bearer_token: String,
}

impl XApiPublisher {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("hinglish-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            http,
            bearer_token: bearer_token.into(),
        }
    }

    async fn create_tweet(&self, text: &str, media_id: Option<&str>) -> Result<Option<String>> {
        #[derive(Serialize)]
        struct Media<'a> {
            media_ids: Vec<&'a str>,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            text: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            media: Option<Media<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            data: RespData,
        }
        #[derive(Deserialize)]
        struct RespData {
            id: String,
        }

        let req = Req {
            text,
            media: media_id.map(|id| Media {
                media_ids: vec![id],
            }),
        };

        let resp = self
            .http
            .post(TWEETS_ENDPOINT)
            .bearer_auth(&self.bearer_token)
            .json(&req)
            .send()
            .await
            .context("sending create-tweet request")?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "create tweet refused");
            return Ok(None);
        }
        let body: Resp = resp.json().await.context("decoding create-tweet response")?;
        Ok(Some(body.data.id))
    }

    async fn upload_media(&self, image: &Path) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct Resp {
            media_id_string: String,
        }

        let bytes = tokio::fs::read(image)
            .await
            .with_context(|| format!("reading media file {}", image.display()))?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(
            image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "media.jpg".to_string()),
        );
        let form = reqwest::multipart::Form::new().part("media", part);

        let resp = self
            .http
            .post(MEDIA_UPLOAD_ENDPOINT)
            .bearer_auth(&self.bearer_token)
            .multipart(form)
            .send()
            .await
            .context("uploading media")?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "media upload refused");
            return Ok(None);
        }
        let body: Resp = resp.json().await.context("decoding media upload response")?;
        Ok(Some(body.media_id_string))
    }
}

#[async_trait]
impl Publisher for XApiPublisher {
    async fn publish_text(&self, text: &str) -> Result<Option<String>> {
        self.create_tweet(text, None).await
    }

    async fn publish_with_media(&self, text: &str, image: &Path) -> Result<Option<String>> {
        match self.upload_media(image).await? {
            Some(media_id) => self.create_tweet(text, Some(&media_id)).await,
            None => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        "x-api"
    }
}

/// Test double: records every published text and hands out sequential ids,
/// or refuses everything when constructed with `refusing()`.
pub struct MockPublisher {
    published: Mutex<Vec<String>>,
    refuse: bool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            refuse: false,
        }
    }

    pub fn refusing() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            refuse: true,
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().expect("mock publisher poisoned").clone()
    }

    fn accept(&self, text: &str) -> Option<String> {
        if self.refuse {
            return None;
        }
        let mut v = self.published.lock().expect("mock publisher poisoned");
        v.push(text.to_string());
        Some(format!("mock-{}", v.len()))
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish_text(&self, text: &str) -> Result<Option<String>> {
        Ok(self.accept(text))
    }

    async fn publish_with_media(&self, text: &str, _image: &Path) -> Result<Option<String>> {
        Ok(self.accept(text))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
