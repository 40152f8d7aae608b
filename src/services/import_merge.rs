//! Import merge and category deletion rules.
//!
//! Pure functions from one snapshot to the next; the sync controller runs
//! them inside `commit`.

use serde::Serialize;

use crate::types::link::{Category, LinkItem};
use crate::types::snapshot::Snapshot;

/// Outcome of an import, reported back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub links_added: usize,
}

/// Folds imported links and categories into `current`.
///
/// An imported category is appended only when neither its ID nor its name
/// matches an existing category (exact, case-sensitive); otherwise it is
/// dropped. Every imported link is appended, duplicates included.
pub fn merge(current: &Snapshot, links: &[LinkItem], categories: &[Category]) -> (Snapshot, ImportReport) {
    let mut merged_categories = current.categories.clone();
    for incoming in categories {
        let collides = merged_categories
            .iter()
            .any(|c| c.id == incoming.id || c.name == incoming.name);
        if !collides {
            merged_categories.push(incoming.clone());
        }
    }

    let mut merged_links = current.links.clone();
    merged_links.extend_from_slice(links);

    let merged = Snapshot {
        links: merged_links,
        categories: merged_categories,
        settings: current.settings.clone(),
    };
    (
        merged,
        ImportReport {
            links_added: links.len(),
        },
    )
}

/// Removes a category, moving its links to `fallback_id`.
///
/// If no category is left, `default_category` is reinserted so the
/// collection is never empty.
pub fn delete_category(
    current: &Snapshot,
    category_id: &str,
    fallback_id: &str,
    default_category: &Category,
) -> Snapshot {
    let mut categories: Vec<Category> = current
        .categories
        .iter()
        .filter(|c| c.id != category_id)
        .cloned()
        .collect();
    if categories.is_empty() {
        categories.push(default_category.clone());
    }

    let links = current
        .links
        .iter()
        .map(|l| {
            if l.category_id == category_id {
                LinkItem {
                    category_id: fallback_id.to_string(),
                    ..l.clone()
                }
            } else {
                l.clone()
            }
        })
        .collect();

    Snapshot {
        links,
        categories,
        settings: current.settings.clone(),
    }
}
