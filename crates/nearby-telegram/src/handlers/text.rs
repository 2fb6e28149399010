use std::sync::Arc;

use teloxide::prelude::*;

use nearby_core::{
    domain::ChatId,
    messaging::types::{ReplyKeyboard, ALL_CATEGORIES_LABEL},
    themes::ThemeGroup,
};

use crate::router::AppState;

use super::commands::send_main_menu;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text().map(|s| s.trim().to_string()) else {
        return Ok(());
    };
    if text.is_empty() {
        return Ok(());
    }
    let chat_id = ChatId(msg.chat.id.0);

    if text == ALL_CATEGORIES_LABEL {
        send_main_menu(&state, chat_id).await;
        return Ok(());
    }

    if let Some(group) = ThemeGroup::resolve(&text) {
        if let Err(e) = state
            .messenger
            .send_keyboard(chat_id, "Select a search query", ReplyKeyboard::group_menu(group))
            .await
        {
            tracing::error!(chat_id = chat_id.0, "failed to send {} menu: {e}", group.label());
        }
        return Ok(());
    }

    state.service.lookup(chat_id, &text).await;
    Ok(())
}
