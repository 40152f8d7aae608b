//! App Core for CloudNav.
//!
//! Wires the database, local cache, remote store and sync controller
//! together, plus the session-scoped category locks and the optional
//! integrations.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::database::connection::Database;
use crate::managers::category_lock::CategoryLockManager;
use crate::managers::sync_controller::SyncController;
use crate::services::ai_describer::{DescriptionGenerator, HttpDescriptionGenerator};
use crate::services::local_cache::LocalCache;
use crate::services::remote_store::{HttpRemoteStore, RemoteStore};
use crate::services::webdav_backup::WebDavBackup;
use crate::types::config::AppConfig;
use crate::types::sync::LoadSource;

/// Central application struct.
pub struct App {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
    pub controller: SyncController,
    pub locks: CategoryLockManager,
    pub backup: WebDavBackup,
    pub describer: Arc<dyn DescriptionGenerator>,
    /// Raised to stop a running bulk description fill.
    pub fill_cancel: Arc<AtomicBool>,
}

impl App {
    /// Opens the database at `db_path` and talks HTTP to `config.remote_url`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(config: AppConfig, db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let db = Arc::new(Database::open(db_path)?);
        let remote = Arc::new(HttpRemoteStore::new(config.remote_url.clone(), timeout)?);
        let describer = Arc::new(HttpDescriptionGenerator::new(timeout)?);
        Self::with_services(config, db, remote, describer)
    }

    /// Builds the app around caller-supplied collaborators.
    pub fn with_services(
        config: AppConfig,
        db: Arc<Database>,
        remote: Arc<dyn RemoteStore>,
        describer: Arc<dyn DescriptionGenerator>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Arc::new(config);
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let cache = LocalCache::new(
            db.clone(),
            config.storage_keys.clone(),
            config.seed.clone(),
        )?;
        let controller = SyncController::new(config.clone(), cache, remote);
        let backup = WebDavBackup::new(timeout)?;

        Ok(Self {
            config,
            db,
            controller,
            locks: CategoryLockManager::new(),
            backup,
            describer,
            fill_cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Loads the starting snapshot.
    pub async fn startup(&mut self) -> LoadSource {
        let source = self.controller.initialize().await;
        info!(
            "CloudNav ready: {} links, {} categories (from {:?})",
            self.controller.snapshot().links.len(),
            self.controller.snapshot().categories.len(),
            source
        );
        source
    }
}
