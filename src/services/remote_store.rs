//! Remote Store client for CloudNav.
//!
//! The remote side is a single JSON resource holding the whole snapshot.
//! Reads are anonymous; writes replace the resource wholesale and carry the
//! shared credential in the `x-auth-password` header.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};

use crate::types::errors::RemoteError;
use crate::types::snapshot::{Snapshot, SnapshotPayload};
use crate::types::sync::Credential;

/// Header carrying the shared write credential.
pub const AUTH_HEADER: &str = "x-auth-password";

/// Access to the remote snapshot resource.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the remote snapshot. `Ok(None)` means the store is empty.
    async fn fetch_snapshot(&self) -> Result<Option<SnapshotPayload>, RemoteError>;

    /// Replaces the remote snapshot.
    async fn replace_snapshot(&self, snapshot: &Snapshot, credential: &Credential) -> Result<(), RemoteError>;
}

/// `RemoteStore` over HTTP.
pub struct HttpRemoteStore {
    client: Client,
    endpoint: String,
}

impl HttpRemoteStore {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_snapshot(&self) -> Result<Option<SnapshotPayload>, RemoteError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            debug!("remote store returned an empty body");
            return Ok(None);
        }

        let payload: Option<SnapshotPayload> = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        Ok(payload)
    }

    async fn replace_snapshot(&self, snapshot: &Snapshot, credential: &Credential) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTH_HEADER, credential.expose())
            .json(snapshot)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
            status => Err(RemoteError::Status(status.as_u16())),
        }
    }
}
