use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{geo::BoundingBox, Result};

/// OneMap account used to obtain access tokens.
#[derive(Clone, Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// An issued OneMap access token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessCredential {
    /// Placeholder that is already expired, forcing a login on first use.
    pub fn expired() -> Self {
        Self {
            token: String::new(),
            expires_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Parameters of one theme search.
#[derive(Clone, Debug)]
pub struct ThemeQuery {
    pub query_name: String,
    pub token: String,
    pub extents: BoundingBox,
}

/// Hexagonal port for the upstream geospatial API.
///
/// Implementations map transport failures into `Error::UpstreamAuth`,
/// `Error::UpstreamSearch` or `Error::UpstreamTimeout`.
#[async_trait]
pub trait OneMapApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessCredential>;

    /// Run a theme search and return the raw JSON body.
    async fn retrieve_theme(&self, query: &ThemeQuery) -> Result<serde_json::Value>;
}

/// Durable storage for the access credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<AccessCredential>>;
    async fn save(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()>;
}
