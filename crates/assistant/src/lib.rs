//! # LLaMAid Assistant
//!
//! Client for the upstream language model that answers crew queries.
//!
//! The core crate treats the assistant as an opaque `ask(prompt) -> text` function. This crate
//! provides that function over HTTP against an Ollama-compatible `/api/generate` endpoint, plus
//! the fallback behaviour used by interactive surfaces when the call fails.

use async_trait::async_trait;
use llamaid_core::FALLBACK_RESPONSE;
use llamaid_types::PromptText;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Instructions prepended to every crew query.
pub const SYSTEM_PROMPT: &str = "You are an expert emergency medical assistant built to support paramedics and EMTs inside ambulances. \
You respond with clear, step-by-step medical guidance based on standard emergency protocols. \
Be confident, precise, and calm. Prioritize immediate action and avoid unnecessary disclaimers. \
Do not make assumptions without information. If you need clarification, say what you need.\n\n\
EMT query: ";

pub const DEFAULT_ASSISTANT_URL: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream error: HTTP {status} - {body}")]
    Upstream { status: u16, body: String },
    #[error("upstream returned an empty response")]
    EmptyResponse,
    #[error("invalid assistant configuration: {0}")]
    InvalidConfig(String),
}

/// Anything that can answer a crew query with free text.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(&self, prompt: &PromptText) -> Result<String, AssistantError>;
}

/// Connection settings for [`OllamaAssistant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub url: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ASSISTANT_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AssistantConfig {
    /// Build settings from optional raw environment values.
    ///
    /// Missing or blank values fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `AssistantError::InvalidConfig` if the timeout is not a positive integer.
    pub fn from_env_values(
        url: Option<String>,
        model: Option<String>,
        timeout_ms: Option<String>,
    ) -> Result<Self, AssistantError> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let defaults = Self::default();
        let timeout_ms = match non_blank(timeout_ms) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    AssistantError::InvalidConfig(format!("timeout must be a positive integer: {raw}"))
                })?,
            None => defaults.timeout_ms,
        };

        Ok(Self {
            url: non_blank(url).unwrap_or(defaults.url),
            model: non_blank(model).unwrap_or(defaults.model),
            timeout_ms,
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Assistant backed by an Ollama-compatible generate endpoint.
#[derive(Debug, Clone)]
pub struct OllamaAssistant {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl OllamaAssistant {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }
}

/// Full prompt sent upstream for a crew query.
pub fn full_prompt(prompt: &PromptText) -> String {
    format!("{SYSTEM_PROMPT}{prompt}")
}

#[async_trait]
impl Assistant for OllamaAssistant {
    async fn ask(&self, prompt: &PromptText) -> Result<String, AssistantError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: full_prompt(prompt),
            stream: false,
        };

        tracing::debug!("asking {} via {}", self.config.model, self.config.url);
        let response = self.client.post(&self.config.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        if parsed.response.trim().is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(parsed.response)
    }
}

/// Ask `assistant`, substituting [`FALLBACK_RESPONSE`] when the call fails.
///
/// Interactive surfaces display whatever this returns, so failures become ordinary text that
/// the annotator and classifier handle like any other response.
pub async fn ask_or_fallback(assistant: &dyn Assistant, prompt: &PromptText) -> String {
    match assistant.ask(prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("assistant call failed: {}", e);
            FALLBACK_RESPONSE.to_owned()
        }
    }
}
