use serde::{Deserialize, Serialize};

/// WebDAV backup target, stored locally only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebDavConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub enabled: bool,
}

impl WebDavConfig {
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.url.trim().is_empty()
    }
}

/// Supported AI providers for description generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Gemini,
    /// Any OpenAI-compatible `chat/completions` endpoint.
    Openai,
}

/// AI-assist configuration record, stored locally only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    pub provider: AiProvider,
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            api_key: String::new(),
            base_url: String::new(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

impl AiConfig {
    /// Base URL to use for requests, falling back to the provider's public API.
    pub fn effective_base_url(&self) -> String {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        match self.provider {
            AiProvider::Gemini => "https://generativelanguage.googleapis.com".to_string(),
            AiProvider::Openai => "https://api.openai.com/v1".to_string(),
        }
    }
}
