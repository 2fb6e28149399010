use std::sync::Arc;

use nearby_core::{
    config::Config,
    credentials::{JsonFileCredentialStore, TokenManager},
    ports::OneMapApi,
    search::FacilitySearch,
};
use nearby_onemap::OneMapClient;

#[tokio::main]
async fn main() -> Result<(), nearby_core::Error> {
    nearby_core::logging::init("nearby")?;

    let cfg = Arc::new(Config::load()?);

    let api: Arc<dyn OneMapApi> = Arc::new(OneMapClient::new(
        cfg.onemap_base_url.clone(),
        cfg.http_timeout,
    )?);
    let store = Arc::new(JsonFileCredentialStore::new(cfg.credential_file.clone()));
    let tokens = Arc::new(
        TokenManager::restore(
            api.clone(),
            store,
            cfg.onemap_login.clone(),
            cfg.seed_credential.clone(),
        )
        .await,
    );
    tracing::info!(
        "OneMap token valid until {}",
        tokens.current().await.expires_at.to_rfc3339()
    );

    let search = FacilitySearch::new(api, tokens);

    nearby_telegram::router::run_polling(cfg, search)
        .await
        .map_err(|e| nearby_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
