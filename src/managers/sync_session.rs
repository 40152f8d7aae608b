//! State shared between the sync controller and the push worker: the
//! credential, the auth-prompt flag, and the sync status.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::types::sync::{Credential, SyncStatus};

pub struct SyncSession {
    credential: Mutex<Option<Credential>>,
    auth_prompt: AtomicBool,
    status: watch::Sender<SyncStatus>,
    saved_epoch: AtomicU64,
    latest_seq: AtomicU64,
    confirmed_seq: AtomicU64,
    saved_indicator: Duration,
}

impl SyncSession {
    pub fn new(saved_indicator: Duration) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            credential: Mutex::new(None),
            auth_prompt: AtomicBool::new(false),
            status,
            saved_epoch: AtomicU64::new(0),
            latest_seq: AtomicU64::new(0),
            confirmed_seq: AtomicU64::new(0),
            saved_indicator,
        }
    }

    fn lock_credential(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        self.credential.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.lock_credential().clone()
    }

    /// Installs or clears the credential. An empty secret counts as none.
    pub fn set_credential(&self, credential: Option<Credential>) {
        *self.lock_credential() = credential.filter(|c| !c.is_empty());
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_credential().is_some()
    }

    pub fn holds_credential(&self, credential: &Credential) -> bool {
        self.lock_credential().as_ref() == Some(credential)
    }

    /// Clears the credential if it is still `rejected`. Returns whether it was cleared.
    pub fn reject_credential(&self, rejected: &Credential) -> bool {
        let mut guard = self.lock_credential();
        if guard.as_ref() == Some(rejected) {
            *guard = None;
            self.auth_prompt.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    pub fn request_auth(&self) {
        self.auth_prompt.store(true, Ordering::SeqCst);
    }

    pub fn clear_auth_prompt(&self) {
        self.auth_prompt.store(false, Ordering::SeqCst);
    }

    pub fn auth_prompt_pending(&self) -> bool {
        self.auth_prompt.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn set_status(&self, status: SyncStatus) {
        self.status.send_replace(status);
    }

    /// Marks `saved` and schedules the revert to `idle`. A later `saved`
    /// restarts the delay; any other status cancels the revert.
    pub fn mark_saved(self: &Arc<Self>) {
        let epoch = self.saved_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_status(SyncStatus::Saved);

        let session = Arc::clone(self);
        let delay = self.saved_indicator;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if session.saved_epoch.load(Ordering::SeqCst) != epoch {
                return;
            }
            session.status.send_if_modified(|status| {
                if *status == SyncStatus::Saved {
                    *status = SyncStatus::Idle;
                    true
                } else {
                    false
                }
            });
        });
    }

    /// Returns a `saving` status to `idle` when nothing is left to send.
    pub fn settle_saving(&self) {
        self.status.send_if_modified(|status| {
            if *status == SyncStatus::Saving {
                *status = SyncStatus::Idle;
                true
            } else {
                false
            }
        });
    }

    pub fn record_enqueued(&self, seq: u64) {
        self.latest_seq.store(seq, Ordering::SeqCst);
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq.load(Ordering::SeqCst)
    }

    pub fn record_confirmed(&self, seq: u64) {
        self.confirmed_seq.fetch_max(seq, Ordering::SeqCst);
    }

    /// Sequence number of the newest snapshot the remote store acknowledged.
    pub fn confirmed_seq(&self) -> u64 {
        self.confirmed_seq.load(Ordering::SeqCst)
    }
}
