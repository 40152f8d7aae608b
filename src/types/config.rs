use serde::{Deserialize, Serialize};

use super::link::{Category, LinkItem};
use super::settings::SiteSettings;

/// Immutable application configuration handed to the sync controller.
///
/// Every field has a default so a partial `config.json` is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// The single remote resource holding the snapshot.
    pub remote_url: String,
    pub request_timeout_secs: u64,
    /// How long the `saved` status is shown before reverting to `idle`.
    pub saved_indicator_ms: u64,
    /// Category that receives links of a deleted category.
    pub fallback_category_id: String,
    pub storage_keys: StorageKeys,
    pub seed: SeedData,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            remote_url: "http://127.0.0.1:8788/api/storage".to_string(),
            request_timeout_secs: 30,
            saved_indicator_ms: 2000,
            fallback_category_id: "common".to_string(),
            storage_keys: StorageKeys::default(),
            seed: SeedData::default(),
        }
    }
}

impl AppConfig {
    /// Category reinserted when deletion would leave the collection empty.
    pub fn default_category(&self) -> Category {
        self.seed.categories.first().cloned().unwrap_or_else(|| Category {
            id: self.fallback_category_id.clone(),
            name: "Common".to_string(),
            icon: "Star".to_string(),
            password: None,
        })
    }
}

/// Keys used in the local key-value store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageKeys {
    pub data_cache: String,
    pub auth_token: String,
    pub webdav_config: String,
    pub ai_config: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            data_cache: "cloudnav_data_cache".to_string(),
            auth_token: "cloudnav_auth_token".to_string(),
            webdav_config: "cloudnav_webdav_config".to_string(),
            ai_config: "cloudnav_ai_config".to_string(),
        }
    }
}

/// Built-in content used when neither the remote store nor the local cache
/// has anything to offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeedData {
    pub categories: Vec<Category>,
    pub links: Vec<LinkItem>,
    pub settings: SiteSettings,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            links: default_links(),
            settings: SiteSettings::default(),
        }
    }
}

fn category(id: &str, name: &str, icon: &str) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        password: None,
    }
}

fn seed_link(id: &str, title: &str, url: &str, description: &str, category_id: &str) -> LinkItem {
    LinkItem {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        description: Some(description.to_string()),
        icon: None,
        category_id: category_id.to_string(),
        pinned: false,
        created_at: 0,
    }
}

fn default_categories() -> Vec<Category> {
    vec![
        category("common", "Common", "Star"),
        category("dev", "Development", "Code"),
        category("design", "Design", "Palette"),
        category("read", "Reading", "BookOpen"),
        category("ent", "Entertainment", "Gamepad2"),
        category("ai", "AI Tools", "Bot"),
    ]
}

fn default_links() -> Vec<LinkItem> {
    let mut links = vec![
        seed_link("1", "GitHub", "https://github.com", "Code hosting and collaboration", "dev"),
        seed_link("2", "Rust", "https://www.rust-lang.org", "A language empowering everyone", "dev"),
        seed_link("3", "Figma", "https://www.figma.com", "Collaborative interface design", "design"),
        seed_link("4", "Hacker News", "https://news.ycombinator.com", "Tech news and discussion", "read"),
        seed_link("5", "YouTube", "https://www.youtube.com", "Video platform", "ent"),
        seed_link("6", "Gemini", "https://gemini.google.com", "Google AI assistant", "ai"),
    ];
    links[0].pinned = true;
    links
}
