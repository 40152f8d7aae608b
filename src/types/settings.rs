use serde::{Deserialize, Serialize};

/// Dashboard display settings, exchanged as part of every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub title: String,
    pub nav_title: String,
    pub favicon: String,
    pub card_style: CardStyle,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "CloudNav - My Navigation".to_string(),
            nav_title: "CloudNav".to_string(),
            favicon: "/favicon.ico".to_string(),
            card_style: CardStyle::Detailed,
        }
    }
}

/// How link cards are rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    Simple,
    #[default]
    Detailed,
}
