//! OneMap adapter (token login + theme search).
//!
//! Implements the `nearby-core` `OneMapApi` port over the OneMap private API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use nearby_core::{
    errors::Error,
    ports::{AccessCredential, LoginCredentials, OneMapApi, ThemeQuery},
    Result,
};

const LOGIN_PATH: &str = "/privateapi/auth/post/getToken";
const THEME_PATH: &str = "/privateapi/themesvc/retrieveTheme";
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Clone, Debug)]
pub struct OneMapClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expiry_timestamp: serde_json::Value,
}

impl OneMapClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::External(format!("reqwest client build: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl OneMapApi for OneMapClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessCredential> {
        let resp = self
            .http
            .post(self.url(LOGIN_PATH))
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| map_transport_error("onemap login", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("onemap login failed: {status}");
            return Err(Error::UpstreamAuth(upstream_message(&body)));
        }

        let parsed: TokenResponse = resp
            .json()
            .await
            .map_err(|e| map_transport_error("onemap login", e))?;

        let expires_at = parse_expiry(&parsed.expiry_timestamp).ok_or_else(|| {
            Error::UpstreamAuth(format!(
                "invalid expiry_timestamp {}",
                parsed.expiry_timestamp
            ))
        })?;

        Ok(AccessCredential {
            token: parsed.access_token,
            expires_at,
        })
    }

    async fn retrieve_theme(&self, query: &ThemeQuery) -> Result<serde_json::Value> {
        let extents = query.extents.to_string();
        let resp = self
            .http
            .get(self.url(THEME_PATH))
            .query(&[
                ("queryName", query.query_name.as_str()),
                ("token", query.token.as_str()),
                ("extents", extents.as_str()),
            ])
            .send()
            .await
            .map_err(|e| map_transport_error("onemap theme search", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("{status}, {}", preview(&body));
            return Err(Error::UpstreamSearch(upstream_message(&body)));
        }

        resp.json()
            .await
            .map_err(|e| map_transport_error("onemap theme search", e))
    }
}

fn map_transport_error(context: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        return Error::UpstreamTimeout(format!("{context} timed out"));
    }
    if e.is_decode() {
        return Error::UpstreamSearch(format!("{context} returned invalid json: {e}"));
    }
    Error::External(format!("{context} request error: {e}"))
}

/// The upstream `error` field if present, otherwise a short body preview.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| preview(body))
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}

/// `expiry_timestamp` arrives as Unix seconds, either quoted or bare.
fn parse_expiry(raw: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match raw {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::<Utc>::from_timestamp(secs, 0)
}
