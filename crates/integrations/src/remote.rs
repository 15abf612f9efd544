//! Supabase-style REST mirror.

use async_trait::async_trait;
use domain::{RecordMirror, SyncError};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};

/// Remote base URL and anon key.
#[derive(Clone)]
pub struct RemoteSyncConfig {
    pub base_url: String,
    pub api_key: SecretString,
}

impl std::fmt::Debug for RemoteSyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSyncConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// REST client for the remote record store.
///
/// Inserts go to `POST {base}/rest/v1/{table}` and reads to
/// `GET {base}/rest/v1/{table}?select=...`, authenticated with the anon key
/// as both `apikey` and bearer token.
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    client: Client,
    config: RemoteSyncConfig,
}

impl RemoteSyncClient {
    /// Creates a client with its own HTTP client.
    #[must_use]
    pub fn new(config: RemoteSyncConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a client sharing an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, config: RemoteSyncConfig) -> Self {
        Self { client, config }
    }

    /// Returns true when a base URL is set.
    pub fn is_configured(&self) -> bool {
        !self.config.base_url.trim().is_empty()
    }

    /// Table names are `[A-Za-z0-9_]+` and are never escaped into the path.
    fn table_url(&self, table: &str) -> Result<String, SyncError> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SyncError::InvalidTable(table.to_string()));
        }
        let base = self.config.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(SyncError::NotConfigured);
        }
        Ok(format!("{base}/rest/v1/{table}"))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.config.api_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }
}

#[async_trait]
impl RecordMirror for RemoteSyncClient {
    #[instrument(skip(self, record))]
    async fn post(&self, table: &str, record: serde_json::Value) -> Result<(), SyncError> {
        let url = self.table_url(table)?;

        let result = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                crate::record_outcome("remote", false);
                return Err(SyncError::Request(e.to_string()));
            }
        };

        let status = response.status();
        crate::record_outcome("remote", status.is_success());
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        debug!(status = status.as_u16(), "record inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch(&self, table: &str, select: &str) -> Result<Vec<serde_json::Value>, SyncError> {
        let url = self.table_url(table)?;

        let result = self
            .authorized(self.client.get(url))
            .query(&[("select", select)])
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                crate::record_outcome("remote", false);
                return Err(SyncError::Request(e.to_string()));
            }
        };

        let status = response.status();
        crate::record_outcome("remote", status.is_success());
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let records: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| SyncError::Response(e.to_string()))?;

        debug!(count = records.len(), "records fetched");
        Ok(records)
    }
}
