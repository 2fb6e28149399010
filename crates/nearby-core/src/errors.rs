/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (user-facing notice vs operator alert).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("upstream auth error: {0}")]
    UpstreamAuth(String),

    #[error("upstream search error: {0}")]
    UpstreamSearch(String),

    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
