use serde::{Deserialize, Serialize};

use super::config::SeedData;
use super::link::{Category, LinkItem};
use super::settings::SiteSettings;

/// The full dashboard state. This triple is the only unit written to the
/// local cache and exchanged with the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub links: Vec<LinkItem>,
    pub categories: Vec<Category>,
    pub settings: SiteSettings,
}

impl Snapshot {
    /// Builds the built-in default snapshot from seed data.
    pub fn from_seed(seed: &SeedData) -> Self {
        Self {
            links: seed.links.clone(),
            categories: seed.categories.clone(),
            settings: seed.settings.clone(),
        }
    }

    pub fn find_link(&self, id: &str) -> Option<&LinkItem> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn find_category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// A snapshot as it may appear on disk or on the wire, where any of the
/// three parts can be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub links: Option<Vec<LinkItem>>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    #[serde(default)]
    pub settings: Option<SiteSettings>,
}

impl SnapshotPayload {
    /// True when the payload carries at least one link.
    pub fn has_links(&self) -> bool {
        self.links.as_ref().map(|l| !l.is_empty()).unwrap_or(false)
    }

    /// Fills every missing part from the seed data.
    pub fn resolve(self, seed: &SeedData) -> Snapshot {
        Snapshot {
            links: self.links.unwrap_or_else(|| seed.links.clone()),
            categories: self.categories.unwrap_or_else(|| seed.categories.clone()),
            settings: self.settings.unwrap_or_else(|| seed.settings.clone()),
        }
    }
}

impl From<Snapshot> for SnapshotPayload {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            links: Some(snapshot.links),
            categories: Some(snapshot.categories),
            settings: Some(snapshot.settings),
        }
    }
}
