//! Access-token lifecycle for the upstream API.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    ports::{AccessCredential, CredentialStore, LoginCredentials, OneMapApi},
    Result,
};

/// Issues valid access tokens, logging in again once the cached one expires.
///
/// Every refresh is written through the injected `CredentialStore`; cache hits
/// never touch the network or the store.
pub struct TokenManager {
    api: Arc<dyn OneMapApi>,
    store: Arc<dyn CredentialStore>,
    login: LoginCredentials,
    current: Mutex<AccessCredential>,
}

impl TokenManager {
    pub fn new(
        api: Arc<dyn OneMapApi>,
        store: Arc<dyn CredentialStore>,
        login: LoginCredentials,
        initial: AccessCredential,
    ) -> Self {
        Self {
            api,
            store,
            login,
            current: Mutex::new(initial),
        }
    }

    /// Build a manager seeded from the store, falling back to `seed` (or an
    /// expired placeholder) when nothing was persisted yet.
    pub async fn restore(
        api: Arc<dyn OneMapApi>,
        store: Arc<dyn CredentialStore>,
        login: LoginCredentials,
        seed: Option<AccessCredential>,
    ) -> Self {
        let initial = match store.load().await {
            Ok(Some(saved)) => saved,
            Ok(None) => seed.unwrap_or_else(AccessCredential::expired),
            Err(e) => {
                tracing::warn!("failed to load stored access token: {e}");
                seed.unwrap_or_else(AccessCredential::expired)
            }
        };
        Self::new(api, store, login, initial)
    }

    pub async fn get_token(&self) -> Result<String> {
        self.get_token_at(Utc::now()).await
    }

    pub async fn get_token_at(&self, now: DateTime<Utc>) -> Result<String> {
        // Held across the refresh so concurrent callers share one login.
        let mut current = self.current.lock().await;
        if current.is_valid_at(now) {
            return Ok(current.token.clone());
        }

        tracing::info!("Updating access token");
        let fresh = self.api.login(&self.login).await?;
        tracing::info!("New token expiry on {}", fresh.expires_at.to_rfc3339());

        if let Err(e) = self.store.save(&fresh.token, fresh.expires_at).await {
            tracing::warn!("failed to persist refreshed access token: {e}");
        }

        let token = fresh.token.clone();
        *current = fresh;
        Ok(token)
    }

    /// Snapshot of the cached credential.
    pub async fn current(&self) -> AccessCredential {
        self.current.lock().await.clone()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CredentialFileData {
    access_token: String,
    expiry_timestamp: i64,
}

/// `CredentialStore` backed by a small JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileCredentialStore {
    path: PathBuf,
}

impl JsonFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for JsonFileCredentialStore {
    async fn load(&self) -> Result<Option<AccessCredential>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let txt = tokio::fs::read_to_string(&self.path).await?;
        if txt.trim().is_empty() {
            return Ok(None);
        }
        let data: CredentialFileData = serde_json::from_str(&txt)?;
        let Some(expires_at) = DateTime::<Utc>::from_timestamp(data.expiry_timestamp, 0) else {
            return Ok(None);
        };
        Ok(Some(AccessCredential {
            token: data.access_token,
            expires_at,
        }))
    }

    async fn save(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let data = CredentialFileData {
            access_token: token.to_string(),
            expiry_timestamp: expires_at.timestamp(),
        };
        let txt = serde_json::to_string(&data)?;
        tokio::fs::write(&self.path, txt).await?;
        tracing::info!("Credential file updated with new access token");
        Ok(())
    }
}
