use serde::{Deserialize, Serialize};

/// A saved link shown on the dashboard.
///
/// `category_id` is not validated against the category collection; a link
/// whose category is gone simply renders under no category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URL or a single glyph. `None` renders the first letter of the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub pinned: bool,
    /// Milliseconds since the UNIX epoch, set once at creation.
    pub created_at: i64,
}

impl LinkItem {
    /// Returns true when the link has no usable description.
    pub fn lacks_description(&self) -> bool {
        self.description
            .as_deref()
            .map(|d| d.trim().is_empty())
            .unwrap_or(true)
    }
}

/// Caller-supplied fields for a new link. `id` and `created_at` are assigned
/// by the sync controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Empty means "use the fallback category".
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub pinned: bool,
}

/// Partial update of an existing link. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

impl LinkPatch {
    /// Applies the patch to `link`, leaving `id` and `created_at` alone.
    pub fn apply_to(&self, link: &LinkItem) -> LinkItem {
        let mut updated = link.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(url) = &self.url {
            updated.url = url.clone();
        }
        if let Some(description) = &self.description {
            updated.description = Some(description.clone());
        }
        if let Some(icon) = &self.icon {
            updated.icon = Some(icon.clone());
        }
        if let Some(category_id) = &self.category_id {
            updated.category_id = category_id.clone();
        }
        if let Some(pinned) = self.pinned {
            updated.pinned = pinned;
        }
        updated
    }
}

/// A named group of links, optionally protected by a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Glyph or icon identifier.
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Category {
    /// A category is lockable only when it carries a non-empty password.
    pub fn is_protected(&self) -> bool {
        self.password.as_deref().map(|p| !p.is_empty()).unwrap_or(false)
    }
}
