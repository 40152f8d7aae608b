//! Sync Controller.
//!
//! Owns the in-memory snapshot and is the only writer of it. Every mutation
//! goes through [`SyncController::commit`]: the new snapshot replaces the old
//! one immediately, is written to the local cache, and is handed to the push
//! queue when a credential is held. Views never wait on the network.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info, warn};
use tokio::sync::watch;
use uuid::Uuid;

use crate::managers::push_queue::PushQueue;
use crate::managers::sync_session::SyncSession;
use crate::services::import_merge::{self, ImportReport};
use crate::services::local_cache::LocalCache;
use crate::services::remote_store::RemoteStore;
use crate::types::config::AppConfig;
use crate::types::errors::{RemoteError, SyncError};
use crate::types::link::{Category, LinkDraft, LinkItem, LinkPatch};
use crate::types::settings::SiteSettings;
use crate::types::snapshot::Snapshot;
use crate::types::sync::{Credential, LoadSource, SyncStatus};

/// Milliseconds since the UNIX epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Time-ordered unique identifier for new links and categories.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

pub struct SyncController {
    config: Arc<AppConfig>,
    cache: LocalCache,
    remote: Arc<dyn RemoteStore>,
    session: Arc<SyncSession>,
    pushes: PushQueue,
    snapshot: Arc<Snapshot>,
}

impl SyncController {
    /// Creates a controller holding the seed snapshot and any stored
    /// credential. Must be called inside a Tokio runtime, which runs the
    /// push worker.
    pub fn new(config: Arc<AppConfig>, cache: LocalCache, remote: Arc<dyn RemoteStore>) -> Self {
        let session = Arc::new(SyncSession::new(std::time::Duration::from_millis(
            config.saved_indicator_ms,
        )));
        session.set_credential(cache.load_credential());
        let pushes = PushQueue::start(Arc::clone(&remote), cache.clone(), Arc::clone(&session));
        let snapshot = Arc::new(Snapshot::from_seed(&config.seed));

        Self {
            config,
            cache,
            remote,
            session,
            pushes,
            snapshot,
        }
    }

    /// Loads the starting snapshot: the remote copy when it carries links,
    /// else the local cache, else the defaults. Fetch failures fall through
    /// silently.
    pub async fn initialize(&mut self) -> LoadSource {
        match self.remote.fetch_snapshot().await {
            Ok(Some(payload)) if payload.has_links() => {
                let snapshot = payload.resolve(&self.config.seed);
                if let Err(e) = self.cache.write(&snapshot) {
                    warn!("failed to cache remote snapshot: {}", e);
                }
                info!("loaded {} links from remote store", snapshot.links.len());
                self.snapshot = Arc::new(snapshot);
                return LoadSource::Remote;
            }
            Ok(_) => debug!("remote store holds no links"),
            Err(e) => warn!("remote fetch failed, using local data: {}", e),
        }

        if let Some(snapshot) = self.cache.read() {
            info!("loaded {} links from local cache", snapshot.links.len());
            self.snapshot = Arc::new(snapshot);
            return LoadSource::Local;
        }

        info!("no stored data, starting from defaults");
        self.snapshot = Arc::new(Snapshot::from_seed(&self.config.seed));
        LoadSource::Defaults
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn status(&self) -> SyncStatus {
        self.session.status()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.session.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn auth_prompt_pending(&self) -> bool {
        self.session.auth_prompt_pending()
    }

    pub fn dismiss_auth_prompt(&self) {
        self.session.clear_auth_prompt();
    }

    /// Sequence number of the newest commit the remote store acknowledged.
    pub fn confirmed_seq(&self) -> u64 {
        self.session.confirmed_seq()
    }

    /// Fails with `AuthRequired`, raising the prompt, when `require_auth` is
    /// set and no credential is held.
    pub fn ensure_authorized(&self, require_auth: bool) -> Result<(), SyncError> {
        if require_auth && !self.session.is_authenticated() {
            self.session.request_auth();
            return Err(SyncError::AuthRequired);
        }
        Ok(())
    }

    /// Applies `mutation` optimistically.
    ///
    /// With `require_auth` and no credential, nothing changes and the auth
    /// prompt is raised. Otherwise the new snapshot is live immediately,
    /// cached locally, and queued for the remote store if a credential is
    /// held.
    pub fn commit<F>(&mut self, require_auth: bool, mutation: F) -> Result<(), SyncError>
    where
        F: FnOnce(&Snapshot) -> Snapshot,
    {
        self.ensure_authorized(require_auth)?;

        let next = Arc::new(mutation(&self.snapshot));
        self.snapshot = Arc::clone(&next);

        if let Err(e) = self.cache.write(&next) {
            error!("failed to write local cache: {}", e);
        }
        if let Some(credential) = self.session.credential() {
            let seq = self.pushes.enqueue(next, credential);
            debug!("commit #{} queued for push", seq);
        }
        Ok(())
    }

    /// Verifies `password` by pushing the current snapshot with it. On
    /// success the credential is kept for the session and stored sealed.
    ///
    /// The push goes through the push queue behind any earlier pushes, so
    /// the remote store ends up holding the current snapshot.
    pub async fn login(&mut self, password: &str) -> Result<(), SyncError> {
        if password.is_empty() {
            return Err(SyncError::Unauthorized);
        }
        let credential = Credential::new(password);
        let (seq, outcome) = self
            .pushes
            .verify(Arc::clone(&self.snapshot), credential.clone());
        let outcome = outcome
            .await
            .unwrap_or_else(|_| Err(RemoteError::Network("push worker stopped".to_string())));
        match outcome {
            Ok(()) => {
                if let Err(e) = self.cache.store_credential(&credential) {
                    warn!("failed to persist credential: {}", e);
                }
                self.session.set_credential(Some(credential));
                self.session.clear_auth_prompt();
                if self.session.latest_seq() == seq {
                    self.session.mark_saved();
                }
                info!("login succeeded");
                Ok(())
            }
            Err(e) => {
                warn!("login failed: {}", e);
                if self.session.latest_seq() == seq {
                    self.session.settle_saving();
                }
                Err(e.into())
            }
        }
    }

    /// Forgets the credential in memory and in the sealed store.
    pub fn logout(&mut self) {
        self.session.set_credential(None);
        if let Err(e) = self.cache.clear_credential() {
            warn!("failed to remove stored credential: {}", e);
        }
        info!("logged out");
    }

    fn ensure_link(&self, id: &str) -> Result<(), SyncError> {
        if self.snapshot.find_link(id).is_none() {
            return Err(SyncError::LinkNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Prepends a new link and returns its ID. An empty category ID means
    /// the fallback category.
    pub fn add_link(&mut self, draft: LinkDraft) -> Result<String, SyncError> {
        self.ensure_authorized(true)?;
        let link = LinkItem {
            id: new_id(),
            title: draft.title,
            url: draft.url,
            description: draft.description,
            icon: draft.icon,
            category_id: if draft.category_id.is_empty() {
                self.config.fallback_category_id.clone()
            } else {
                draft.category_id
            },
            pinned: draft.pinned,
            created_at: now_millis(),
        };
        let id = link.id.clone();
        self.commit(true, move |s| {
            let mut links = Vec::with_capacity(s.links.len() + 1);
            links.push(link);
            links.extend(s.links.iter().cloned());
            Snapshot {
                links,
                ..s.clone()
            }
        })?;
        Ok(id)
    }

    pub fn edit_link(&mut self, id: &str, patch: &LinkPatch) -> Result<(), SyncError> {
        self.ensure_authorized(true)?;
        self.ensure_link(id)?;
        self.commit(true, |s| Snapshot {
            links: s
                .links
                .iter()
                .map(|l| if l.id == id { patch.apply_to(l) } else { l.clone() })
                .collect(),
            ..s.clone()
        })
    }

    pub fn delete_link(&mut self, id: &str) -> Result<(), SyncError> {
        self.ensure_authorized(true)?;
        self.ensure_link(id)?;
        self.commit(true, |s| Snapshot {
            links: s.links.iter().filter(|l| l.id != id).cloned().collect(),
            ..s.clone()
        })
    }

    pub fn toggle_pin(&mut self, id: &str) -> Result<(), SyncError> {
        self.ensure_authorized(true)?;
        self.ensure_link(id)?;
        self.commit(true, |s| Snapshot {
            links: s
                .links
                .iter()
                .map(|l| {
                    if l.id == id {
                        LinkItem {
                            pinned: !l.pinned,
                            ..l.clone()
                        }
                    } else {
                        l.clone()
                    }
                })
                .collect(),
            ..s.clone()
        })
    }

    /// Moves `source_id` to the position currently held by `target_id`.
    pub fn reorder_link(&mut self, source_id: &str, target_id: &str) -> Result<(), SyncError> {
        self.ensure_authorized(true)?;
        let from = self
            .snapshot
            .links
            .iter()
            .position(|l| l.id == source_id)
            .ok_or_else(|| SyncError::LinkNotFound(source_id.to_string()))?;
        let to = self
            .snapshot
            .links
            .iter()
            .position(|l| l.id == target_id)
            .ok_or_else(|| SyncError::LinkNotFound(target_id.to_string()))?;
        if from == to {
            return Ok(());
        }
        self.commit(true, |s| {
            let mut links = s.links.clone();
            let moved = links.remove(from);
            links.insert(to, moved);
            Snapshot {
                links,
                ..s.clone()
            }
        })
    }

    pub fn set_description(&mut self, id: &str, description: &str) -> Result<(), SyncError> {
        let patch = LinkPatch {
            description: Some(description.to_string()),
            ..LinkPatch::default()
        };
        self.edit_link(id, &patch)
    }

    /// Appends a category and returns its ID. An empty password means none.
    pub fn add_category(
        &mut self,
        name: &str,
        icon: &str,
        password: Option<String>,
    ) -> Result<String, SyncError> {
        self.ensure_authorized(true)?;
        let category = Category {
            id: new_id(),
            name: name.to_string(),
            icon: icon.to_string(),
            password: password.filter(|p| !p.is_empty()),
        };
        let id = category.id.clone();
        self.commit(true, move |s| {
            let mut categories = s.categories.clone();
            categories.push(category);
            Snapshot {
                categories,
                ..s.clone()
            }
        })?;
        Ok(id)
    }

    /// Replaces the category list, and the link list too when given.
    pub fn update_categories(
        &mut self,
        categories: Vec<Category>,
        links: Option<Vec<LinkItem>>,
    ) -> Result<(), SyncError> {
        self.commit(true, move |s| Snapshot {
            links: links.unwrap_or_else(|| s.links.clone()),
            categories,
            settings: s.settings.clone(),
        })
    }

    /// Removes a category; its links move to the fallback category.
    pub fn delete_category(&mut self, id: &str) -> Result<(), SyncError> {
        self.ensure_authorized(true)?;
        if self.snapshot.find_category(id).is_none() {
            return Err(SyncError::CategoryNotFound(id.to_string()));
        }
        let fallback = self.config.fallback_category_id.clone();
        let default_category = self.config.default_category();
        self.commit(true, |s| {
            import_merge::delete_category(s, id, &fallback, &default_category)
        })
    }

    /// Merges imported links and categories. Links whose ID is already taken
    /// get a fresh one so IDs stay unique.
    pub fn import(
        &mut self,
        links: Vec<LinkItem>,
        categories: Vec<Category>,
    ) -> Result<ImportReport, SyncError> {
        self.ensure_authorized(true)?;
        let mut taken: HashSet<String> = self.snapshot.links.iter().map(|l| l.id.clone()).collect();
        let links: Vec<LinkItem> = links
            .into_iter()
            .map(|mut l| {
                if !taken.insert(l.id.clone()) {
                    l.id = new_id();
                    taken.insert(l.id.clone());
                }
                l
            })
            .collect();

        let (merged, report) = import_merge::merge(&self.snapshot, &links, &categories);
        self.commit(true, move |_| merged)?;
        info!("imported {} links", report.links_added);
        Ok(report)
    }

    /// Replaces links and categories wholesale from a backup. Settings stay.
    pub fn restore_backup(
        &mut self,
        links: Vec<LinkItem>,
        categories: Vec<Category>,
    ) -> Result<(), SyncError> {
        self.commit(true, move |s| Snapshot {
            links,
            categories,
            settings: s.settings.clone(),
        })
    }

    /// Site settings may be changed without a credential; they are still
    /// pushed when one is held.
    pub fn update_settings(&mut self, settings: SiteSettings) -> Result<(), SyncError> {
        self.commit(false, move |s| Snapshot {
            settings,
            ..s.clone()
        })
    }
}
