//! Persistent local cache for CloudNav.
//!
//! A key-value store on top of SQLite holding the full snapshot, the stored
//! credential, and the WebDAV and AI configuration records. Reads never
//! fail: a missing key, an unreadable row, or a payload that no longer
//! parses all come back as `None` and the caller substitutes defaults.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::database::Database;
use crate::services::crypto_service::{CryptoService, CryptoServiceTrait};
use crate::types::config::{SeedData, StorageKeys};
use crate::types::credential::EncryptedData;
use crate::types::errors::CacheError;
use crate::types::integrations::{AiConfig, WebDavConfig};
use crate::types::snapshot::{Snapshot, SnapshotPayload};
use crate::types::sync::Credential;

const SEAL_PASSPHRASE: &str = "cloudnav-local-seal-v1";
const SEAL_SALT: &[u8] = b"cloudnav-sealkey";

/// Local key-value cache. Cheap to clone; clones share the database.
#[derive(Clone)]
pub struct LocalCache {
    db: Arc<Database>,
    keys: StorageKeys,
    seed: SeedData,
    seal_key: Arc<Vec<u8>>,
}

impl LocalCache {
    pub fn new(db: Arc<Database>, keys: StorageKeys, seed: SeedData) -> Result<Self, CacheError> {
        let seal_key = CryptoService::new()
            .derive_key(SEAL_PASSPHRASE, SEAL_SALT)
            .map_err(|e| CacheError::CryptoError(e.to_string()))?;
        Ok(Self {
            db,
            keys,
            seed,
            seal_key: Arc::new(seal_key),
        })
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn put_raw(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.db.connection().execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Self::now()],
        )?;
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self
            .db
            .connection()
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;
        self.put_raw(key, &json)
    }

    /// Reads and decodes `key`, treating every failure as absence.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("local cache read of '{}' failed: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding unparsable local record '{}': {}", key, e);
                None
            }
        }
    }

    /// Overwrites the cached snapshot.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), CacheError> {
        self.put_json(&self.keys.data_cache, snapshot)?;
        debug!(
            "cached snapshot: {} links, {} categories",
            snapshot.links.len(),
            snapshot.categories.len()
        );
        Ok(())
    }

    /// Returns the cached snapshot, or `None` when nothing usable is stored.
    ///
    /// Parts missing from an otherwise valid payload are filled from the seed.
    pub fn read(&self) -> Option<Snapshot> {
        self.get_json::<SnapshotPayload>(&self.keys.data_cache)
            .map(|payload| payload.resolve(&self.seed))
    }

    /// Stores the credential sealed with AES-256-GCM.
    pub fn store_credential(&self, credential: &Credential) -> Result<(), CacheError> {
        let sealed = CryptoService::new()
            .encrypt_aes256gcm(credential.expose().as_bytes(), &self.seal_key)
            .map_err(|e| CacheError::CryptoError(e.to_string()))?;
        self.db.connection().execute(
            "INSERT OR REPLACE INTO secure_store (key, ciphertext, iv, auth_tag, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.keys.auth_token, sealed.ciphertext, sealed.iv, sealed.auth_tag, Self::now()],
        )?;
        Ok(())
    }

    /// Returns the stored credential. Unreadable or tampered rows yield `None`.
    pub fn load_credential(&self) -> Option<Credential> {
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT ciphertext, iv, auth_tag FROM secure_store WHERE key = ?1",
                params![self.keys.auth_token],
                |row| {
                    Ok(EncryptedData {
                        ciphertext: row.get(0)?,
                        iv: row.get(1)?,
                        auth_tag: row.get(2)?,
                    })
                },
            )
            .optional();

        let sealed = match row {
            Ok(Some(sealed)) => sealed,
            Ok(None) => return None,
            Err(e) => {
                warn!("stored credential unreadable: {}", e);
                return None;
            }
        };

        let plain = match CryptoService::new().decrypt_aes256gcm(&sealed, &self.seal_key) {
            Ok(plain) => plain,
            Err(e) => {
                warn!("stored credential could not be opened: {}", e);
                return None;
            }
        };
        match String::from_utf8(plain) {
            Ok(secret) if !secret.is_empty() => Some(Credential::new(secret)),
            _ => None,
        }
    }

    pub fn clear_credential(&self) -> Result<(), CacheError> {
        self.db.connection().execute(
            "DELETE FROM secure_store WHERE key = ?1",
            params![self.keys.auth_token],
        )?;
        Ok(())
    }

    pub fn save_webdav_config(&self, config: &WebDavConfig) -> Result<(), CacheError> {
        self.put_json(&self.keys.webdav_config, config)
    }

    /// Stored WebDAV configuration, or the disabled default.
    pub fn load_webdav_config(&self) -> WebDavConfig {
        self.get_json(&self.keys.webdav_config).unwrap_or_default()
    }

    pub fn save_ai_config(&self, config: &AiConfig) -> Result<(), CacheError> {
        self.put_json(&self.keys.ai_config, config)
    }

    /// Stored AI configuration, or the Gemini default with no key.
    pub fn load_ai_config(&self) -> AiConfig {
        self.get_json(&self.keys.ai_config).unwrap_or_default()
    }
}
