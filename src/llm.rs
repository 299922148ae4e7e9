//! Text-generation collaborator: provider trait + Groq chat-completions
//! implementation + test doubles.
//!
//! The pipeline treats any failure here (transport error, non-2xx, empty
//! choice) as "no output" and falls back to the raw topic text, so the trait
//! surface stays a plain `Result` and callers decide how to degrade.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One synchronous-feeling chat completion: system + user prompt in,
    /// trimmed assistant text out. Empty output is a valid "no result".
    async fn generate(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;

    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Groq OpenAI-compatible chat completions provider.
pub struct GroqGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("hinglish-news-bot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for GroqGenerator {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(anyhow!("missing Groq API key"));
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(Msg {
                role: "system",
                content: system,
            });
        }
        messages.push(Msg {
            role: "user",
            content: user,
        });

        let req = Req {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let resp = self
            .http
            .post(GROQ_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("sending chat completion request")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("chat completion HTTP {status}"));
        }

        let body: Resp = resp.json().await.context("decoding chat completion")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .unwrap_or_default();
        Ok(content.to_string())
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}

/// Always yields no output; used when no API key is configured.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _: &str, _: &str, _: f32, _: u32) -> Result<String> {
        Ok(String::new())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic generator for tests: pops scripted responses in order, then
/// keeps returning the last one.
pub struct MockGenerator {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl MockGenerator {
    pub fn fixed(response: impl Into<String>) -> Self {
        let r = response.into();
        Self {
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(r),
        }
    }

    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let q: VecDeque<String> = responses.into_iter().map(Into::into).collect();
        let last = q.back().cloned().unwrap_or_default();
        Self {
            responses: Mutex::new(q),
            last: Mutex::new(last),
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _: &str, _: &str, _: f32, _: u32) -> Result<String> {
        let mut q = self.responses.lock().expect("mock queue poisoned");
        match q.pop_front() {
            Some(r) => {
                *self.last.lock().expect("mock last poisoned") = r.clone();
                Ok(r)
            }
            None => Ok(self.last.lock().expect("mock last poisoned").clone()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
