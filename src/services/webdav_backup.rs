//! WebDAV backup of links and categories.
//!
//! The backup is one JSON file, `cloudnav_backup.json`, under the configured
//! collection URL. Settings are not part of it.

use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::managers::sync_controller::now_millis;
use crate::types::errors::BackupError;
use crate::types::integrations::WebDavConfig;
use crate::types::link::{Category, LinkItem};

pub const BACKUP_FILE_NAME: &str = "cloudnav_backup.json";

/// On-server layout of a backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub links: Vec<LinkItem>,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub exported_at: i64,
}

pub struct WebDavBackup {
    client: Client,
}

impl WebDavBackup {
    pub fn new(timeout: Duration) -> Result<Self, BackupError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackupError::NetworkError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Full URL of the backup file for `config`.
    pub fn backup_url(config: &WebDavConfig) -> Result<Url, BackupError> {
        if !config.is_usable() {
            return Err(BackupError::NotConfigured);
        }
        let base = format!("{}/", config.url.trim().trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|u| u.join(BACKUP_FILE_NAME))
            .map_err(|e| BackupError::NetworkError(format!("invalid WebDAV URL: {}", e)))
    }

    /// Uploads links and categories, replacing any previous backup.
    pub async fn backup(
        &self,
        config: &WebDavConfig,
        links: &[LinkItem],
        categories: &[Category],
    ) -> Result<(), BackupError> {
        let url = Self::backup_url(config)?;
        let file = BackupFile {
            links: links.to_vec(),
            categories: categories.to_vec(),
            exported_at: now_millis(),
        };
        let body = serde_json::to_vec_pretty(&file)
            .map_err(|e| BackupError::InvalidPayload(e.to_string()))?;

        let response = self
            .client
            .put(url)
            .basic_auth(&config.username, Some(&config.password))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| BackupError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackupError::Status(status.as_u16()));
        }
        info!("backed up {} links to WebDAV", links.len());
        Ok(())
    }

    /// Downloads the backup file.
    pub async fn restore(&self, config: &WebDavConfig) -> Result<BackupFile, BackupError> {
        let url = Self::backup_url(config)?;
        let response = self
            .client
            .get(url)
            .basic_auth(&config.username, Some(&config.password))
            .send()
            .await
            .map_err(|e| BackupError::NetworkError(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                debug!("no backup file on server");
                return Err(BackupError::Status(404));
            }
            status => return Err(BackupError::Status(status.as_u16())),
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackupError::NetworkError(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| BackupError::InvalidPayload(e.to_string()))
    }
}
