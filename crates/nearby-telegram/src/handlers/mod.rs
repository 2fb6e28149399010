//! Telegram update handlers.
//!
//! Each handler is a small adapter that pulls what it needs out of the
//! teloxide `Message` and calls into `nearby-core`.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use nearby_core::domain::ChatId;

use crate::router::AppState;
mod commands;
mod location;
mod text;

const UNSUPPORTED_MESSAGE: &str = "Share your location or pick a category from the menu.";

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.location().is_some() {
        return location::handle_location(msg, state).await;
    }

    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(msg, state).await;
        }
        return text::handle_text(msg, state).await;
    }

    let chat_id = ChatId(msg.chat.id.0);
    if let Err(e) = state.messenger.send_html(chat_id, UNSUPPORTED_MESSAGE).await {
        tracing::error!(chat_id = chat_id.0, "failed to send fallback reply: {e}");
    }

    Ok(())
}
