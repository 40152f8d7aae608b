//! Category Lock Manager.
//!
//! Tracks which password-protected categories have been unlocked in the
//! current session. Nothing here is persisted: a new manager starts with
//! every protected category locked.
//!
//! Passwords are compared in plain text with no rate limiting. This keeps
//! casual viewers out of a category; it is not secret protection.

use std::collections::HashSet;

use log::{debug, info};

use crate::types::errors::LockError;
use crate::types::link::Category;

/// Trait defining category lock operations.
pub trait CategoryLockTrait {
    fn is_locked(&self, category: &Category) -> bool;
    fn unlock(&mut self, category: &Category, provided: &str) -> Result<(), LockError>;
    fn relock_all(&mut self);
}

/// Session-scoped set of unlocked category IDs.
#[derive(Debug, Default, Clone)]
pub struct CategoryLockManager {
    unlocked: HashSet<String>,
}

impl CategoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks `category_id` up in `categories`. Unknown IDs are never locked.
    pub fn is_category_id_locked(&self, categories: &[Category], category_id: &str) -> bool {
        categories
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| self.is_locked(c))
            .unwrap_or(false)
    }

    /// Unlocks by ID, resolving the category from `categories`.
    pub fn unlock_by_id(
        &mut self,
        categories: &[Category],
        category_id: &str,
        provided: &str,
    ) -> Result<(), LockError> {
        let category = categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| LockError::UnknownCategory(category_id.to_string()))?;
        self.unlock(category, provided)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }
}

impl CategoryLockTrait for CategoryLockManager {
    fn is_locked(&self, category: &Category) -> bool {
        category.is_protected() && !self.unlocked.contains(&category.id)
    }

    /// Exact-match comparison. A wrong password changes nothing.
    fn unlock(&mut self, category: &Category, provided: &str) -> Result<(), LockError> {
        if !category.is_protected() {
            return Ok(());
        }
        if category.password.as_deref() == Some(provided) {
            info!("category '{}' unlocked for this session", category.id);
            self.unlocked.insert(category.id.clone());
            Ok(())
        } else {
            debug!("wrong password for category '{}'", category.id);
            Err(LockError::WrongPassword(category.id.clone()))
        }
    }

    fn relock_all(&mut self) {
        self.unlocked.clear();
    }
}
