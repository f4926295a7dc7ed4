//! Generative-model seam.
//!
//! Only factual and refusal turns ever reach this interface; the emotional
//! path is assembled purely from the contract and never calls a model.  The
//! default backend is a fixed deterministic responder so the engine's
//! byte-identical-output contract holds end to end out of the box; the
//! Ollama client is the production backend behind the same trait.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Deterministic deflection used when no generative backend is configured.
/// The engine is an emotional companion first; factual questions get a
/// fixed redirect instead of an answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticResponder;

/// The deflection served for factual turns by [`StaticResponder`].
pub const STATIC_FACTUAL_TEXT: &str =
    "I'm better at being here with you than at facts and figures. \
     If something is on your mind, I'm listening.";

#[async_trait]
impl GenerativeModel for StaticResponder {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(STATIC_FACTUAL_TEXT.to_string())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// ── Ollama backend ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Generation options pinned for reproducibility: zero temperature and a
/// fixed seed.  True bit-stability still depends on the backend build.
#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f32,
    seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerativeModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: 0.0,
                seed: 42,
            },
        };

        debug!(model = %self.model, "dispatching generative request");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("ollama request failed")?;

        if !response.status().is_success() {
            bail!("ollama returned status {}", response.status());
        }

        let body: OllamaGenerateResponse =
            response.json().await.context("ollama response malformed")?;
        if body.response.trim().is_empty() {
            bail!("ollama returned an empty response");
        }
        Ok(body.response)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
