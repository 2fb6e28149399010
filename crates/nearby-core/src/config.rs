use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Utc};

use crate::{
    domain::ChatId,
    errors::Error,
    ports::{AccessCredential, LoginCredentials},
    Result,
};

pub const DEFAULT_ONEMAP_BASE_URL: &str = "https://developers.onemap.sg";

/// Typed configuration for the bot, read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub developer_chat_id: Option<ChatId>,

    // OneMap
    pub onemap_base_url: String,
    pub onemap_login: LoginCredentials,
    pub seed_credential: Option<AccessCredential>,
    pub credential_file: PathBuf,

    // Runtime
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        // Required env vars
        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let email = required("ONEMAP_EMAIL")?;
        let password = required("ONEMAP_PASSWORD")?;

        let developer_chat_id = env_i64("DEVELOPER_CHAT_ID").map(ChatId);

        let onemap_base_url = env_str("ONEMAP_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ONEMAP_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        // Optional token issued out of band; the credential file wins if present.
        let seed_credential = seed_credential(
            env_str("ONEMAP_ACCESS_TOKEN").and_then(non_empty),
            env_i64("ONEMAP_TOKEN_EXPIRY"),
        );

        let credential_file = PathBuf::from(
            env_str("CREDENTIAL_FILE")
                .unwrap_or("/tmp/nearby-onemap-credential.json".to_string()),
        );

        let http_timeout = Duration::from_millis(env_u64("HTTP_TIMEOUT_MS").unwrap_or(10_000));

        Ok(Self {
            telegram_bot_token,
            developer_chat_id,
            onemap_base_url,
            onemap_login: LoginCredentials { email, password },
            seed_credential,
            credential_file,
            http_timeout,
        })
    }
}

fn seed_credential(token: Option<String>, expiry: Option<i64>) -> Option<AccessCredential> {
    let token = token?;
    let expires_at = expiry
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    Some(AccessCredential { token, expires_at })
}

fn required(key: &str) -> Result<String> {
    env_str(key)
        .and_then(non_empty)
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
