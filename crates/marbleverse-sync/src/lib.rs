//! Cloud vault client: one remote row per access-code identity, holding the
//! full state blob. Last write wins at the granularity of the whole document.

mod debounce;

pub use debounce::{DebouncedPusher, VaultSink, PUSH_DEBOUNCE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use marbleverse_core::{sync_configured, AppState, SyncSettings};

const VAULTS_TABLE: &str = "vaults";

/// Row shape of the remote vaults table.
#[derive(Debug, Serialize)]
struct VaultRow<'a> {
    user_id: &'a str,
    blob: &'a AppState,
}

#[derive(Debug, Deserialize)]
struct BlobRow {
    blob: AppState,
}

#[derive(Debug)]
pub struct RemoteVault {
    base: String,
    api_key: String,
    identity: String,
    http: reqwest::Client,
}

impl RemoteVault {
    /// Build a client for the configured endpoint and identity.
    pub fn new(settings: &SyncSettings) -> Result<Self, String> {
        if !sync_configured(settings) {
            return Err(
                "cloud sync is not configured; set the endpoint, key and access code".to_string()
            );
        }
        Ok(Self {
            base: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            identity: settings.identity.clone(),
            http: reqwest::Client::new(),
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base, VAULTS_TABLE)
    }

    /// Fetch the remote copy for this identity.
    ///
    /// Ok(None) means "no row yet", distinct from a transport or server
    /// error, so callers can leave local state untouched without noise.
    pub async fn fetch(&self) -> Result<Option<AppState>, String> {
        let filter = format!("eq.{}", self.identity);
        let resp = self
            .http
            .get(self.table_url())
            .query(&[("user_id", filter.as_str()), ("select", "blob")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| format!("remote read: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("remote read failed: {}", resp.status()));
        }

        let rows: Vec<BlobRow> = resp.json().await.map_err(|e| format!("remote read: {e}"))?;
        Ok(rows.into_iter().next().map(|r| r.blob))
    }

    /// Upsert the full state for this identity.
    pub async fn upsert(&self, state: &AppState) -> Result<(), String> {
        let row = VaultRow { user_id: &self.identity, blob: state };
        let resp = self
            .http
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|e| format!("remote write: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("remote write failed: {}", resp.status()));
        }
        Ok(())
    }
}

#[async_trait]
impl VaultSink for RemoteVault {
    async fn store(&self, state: AppState) -> Result<(), String> {
        self.upsert(&state).await
    }
}
