//! AI-generated link descriptions.
//!
//! Asks a Gemini or OpenAI-compatible model for a one-line description of a
//! link, and fills every link lacking one through the sync controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::managers::sync_controller::SyncController;
use crate::types::errors::{AiError, BulkFillError, SyncError};
use crate::types::integrations::{AiConfig, AiProvider};

/// Produces a short description for a link.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe(&self, title: &str, url: &str, config: &AiConfig) -> Result<String, AiError>;
}

fn build_prompt(title: &str, url: &str) -> String {
    format!(
        "Write a concise one-sentence description (at most 20 words) of the website \"{}\" at {}. \
         Reply with the description only.",
        title, url
    )
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// `DescriptionGenerator` over the providers' HTTP APIs.
pub struct HttpDescriptionGenerator {
    client: Client,
}

impl HttpDescriptionGenerator {
    pub fn new(timeout: Duration) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::NetworkError(e.to_string()))?;
        Ok(Self { client })
    }

    async fn ask_gemini(&self, prompt: &str, config: &AiConfig) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.effective_base_url(),
            config.model
        );
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let response = self
            .client
            .post(url)
            .query(&[("key", config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AiError::ProviderError(format!("HTTP {}", response.status())));
        }
        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AiError::ProviderError(e.to_string()))?;
        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }

    async fn ask_openai(&self, prompt: &str, config: &AiConfig) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", config.effective_base_url());
        let body = json!({
            "model": config.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AiError::ProviderError(format!("HTTP {}", response.status())));
        }
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::ProviderError(e.to_string()))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl DescriptionGenerator for HttpDescriptionGenerator {
    async fn describe(&self, title: &str, url: &str, config: &AiConfig) -> Result<String, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }
        let prompt = build_prompt(title, url);
        let text = match config.provider {
            AiProvider::Gemini => self.ask_gemini(&prompt, config).await?,
            AiProvider::Openai => self.ask_openai(&prompt, config).await?,
        };
        let text = text.trim().trim_matches('"').trim().to_string();
        if text.is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Result of a bulk fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl BulkReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Counts the outcome of committing one description. A link deleted
    /// while the provider was answering counts as failed; any other sync
    /// error is passed back to abort the run.
    pub fn record_commit(&mut self, outcome: Result<(), SyncError>) -> Result<(), SyncError> {
        match outcome {
            Ok(()) => self.generated += 1,
            Err(SyncError::LinkNotFound(_)) => self.failed += 1,
            Err(e) => return Err(e),
        }
        Ok(())
    }

    pub fn record_provider_failure(&mut self, link: &PendingDescription, err: &AiError) {
        warn!("description for '{}' failed: {}", link.title, err);
        self.failed += 1;
    }

    pub fn log_summary(&self) {
        info!(
            "bulk description fill: {} generated, {} failed of {}{}",
            self.generated,
            self.failed,
            self.total,
            if self.cancelled { " (cancelled)" } else { "" }
        );
    }
}

/// A link waiting for a generated description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDescription {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Checks the API key and the credential, then lists the links lacking a
/// description. Fails before any request is made.
pub fn plan_bulk_fill(
    controller: &SyncController,
    config: &AiConfig,
) -> Result<Vec<PendingDescription>, BulkFillError> {
    if config.api_key.trim().is_empty() {
        return Err(AiError::MissingApiKey.into());
    }
    controller.ensure_authorized(true)?;

    Ok(controller
        .snapshot()
        .links
        .iter()
        .filter(|l| l.lacks_description())
        .map(|l| PendingDescription {
            id: l.id.clone(),
            title: l.title.clone(),
            url: l.url.clone(),
        })
        .collect())
}

/// Generates a description for every link that lacks one, committing each
/// result as it arrives. A per-link provider failure is logged and skipped;
/// a missing API key or credential aborts before any request is made.
pub async fn fill_missing_descriptions(
    controller: &mut SyncController,
    generator: &dyn DescriptionGenerator,
    config: &AiConfig,
    cancel: Option<&AtomicBool>,
) -> Result<BulkReport, BulkFillError> {
    let pending = plan_bulk_fill(controller, config)?;
    let mut report = BulkReport::new(pending.len());

    for link in pending {
        if cancel.map(|c| c.load(Ordering::SeqCst)).unwrap_or(false) {
            report.cancelled = true;
            break;
        }
        match generator.describe(&link.title, &link.url, config).await {
            Ok(description) => {
                report.record_commit(controller.set_description(&link.id, &description))?
            }
            Err(e) => report.record_provider_failure(&link, &e),
        }
    }

    report.log_summary();
    Ok(report)
}
