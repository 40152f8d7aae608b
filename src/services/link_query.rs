//! Read-only views over a snapshot that respect category locks.

use crate::managers::category_lock::CategoryLockManager;
use crate::types::link::LinkItem;
use crate::types::snapshot::Snapshot;

/// Links whose category is not locked. Orphaned links stay visible.
pub fn visible_links<'a>(snapshot: &'a Snapshot, locks: &CategoryLockManager) -> Vec<&'a LinkItem> {
    snapshot
        .links
        .iter()
        .filter(|l| !locks.is_category_id_locked(&snapshot.categories, &l.category_id))
        .collect()
}

/// Pinned links outside locked categories, in snapshot order.
pub fn pinned_links<'a>(snapshot: &'a Snapshot, locks: &CategoryLockManager) -> Vec<&'a LinkItem> {
    visible_links(snapshot, locks)
        .into_iter()
        .filter(|l| l.pinned)
        .collect()
}

/// Links of one category, or nothing while the category is locked.
pub fn links_in_category<'a>(
    snapshot: &'a Snapshot,
    locks: &CategoryLockManager,
    category_id: &str,
) -> Vec<&'a LinkItem> {
    if locks.is_category_id_locked(&snapshot.categories, category_id) {
        return Vec::new();
    }
    snapshot
        .links
        .iter()
        .filter(|l| l.category_id == category_id)
        .collect()
}

/// Case-insensitive substring search over title, URL and description.
/// A blank query returns every visible link.
pub fn search_links<'a>(
    snapshot: &'a Snapshot,
    locks: &CategoryLockManager,
    query: &str,
) -> Vec<&'a LinkItem> {
    let needle = query.trim().to_lowercase();
    let visible = visible_links(snapshot, locks);
    if needle.is_empty() {
        return visible;
    }
    visible
        .into_iter()
        .filter(|l| {
            l.title.to_lowercase().contains(&needle)
                || l.url.to_lowercase().contains(&needle)
                || l
                    .description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}
