use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the bot.
pub fn init(service_name: &str) -> Result<()> {
    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,nearby=info,nearby_core=info,nearby_onemap=info,nearby_telegram=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}
