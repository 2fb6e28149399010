use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use nearby_core::{
    config::Config, messaging::port::MessagingPort, search::FacilitySearch,
    service::NearbyService,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NearbyService>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>, search: FacilitySearch) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!("nearby bot started: @{}", me.username()),
        Err(e) => tracing::warn!("getMe failed, continuing: {e}"),
    }
    match cfg.developer_chat_id {
        Some(dev) => tracing::info!("Developer alerts go to chat {}", dev.0),
        None => tracing::info!("DEVELOPER_CHAT_ID not set; developer alerts disabled"),
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let service = Arc::new(NearbyService::new(
        search,
        messenger.clone(),
        cfg.developer_chat_id,
    ));

    let state = Arc::new(AppState {
        service,
        messenger,
    });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
