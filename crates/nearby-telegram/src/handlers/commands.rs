use std::sync::Arc;

use teloxide::prelude::*;

use nearby_core::{domain::ChatId, formatting::escape_html, messaging::types::ReplyKeyboard};

use crate::router::AppState;

const HELP_TEXT: &str = "Hello there! This is a location bot powered by OneMap API.\n\n\
This bot provides many useful information on nearby places that are contributed and updated by government agencies.\n\n\
You can use /menu or /start to access the main menu. Do share your location before starting a search query!";

const MENU_PROMPT: &str = "Select a category or update your location";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn greeting(username: &str) -> String {
    format!(
        "Hello {}!\nLet's find out whats near you.\n\n\
To begin share with me your location and select a search query from the categories below\n",
        escape_html(username)
    )
}

pub(super) async fn send_main_menu(state: &AppState, chat_id: ChatId) {
    send_menu(state, chat_id, MENU_PROMPT).await;
}

async fn send_menu(state: &AppState, chat_id: ChatId, text: &str) {
    if let Err(e) = state
        .messenger
        .send_keyboard(chat_id, text, ReplyKeyboard::main_menu())
        .await
    {
        tracing::error!(chat_id = chat_id.0, "failed to send main menu: {e}");
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = ChatId(msg.chat.id.0);
    let username = msg
        .from()
        .map(|u| u.username.clone().unwrap_or_else(|| u.first_name.clone()))
        .unwrap_or_else(|| "there".to_string());

    let (cmd, _arg) = parse_command(text);

    match cmd.as_str() {
        "start" => send_menu(&state, chat_id, &greeting(&username)).await,
        "menu" => send_main_menu(&state, chat_id).await,
        "help" => {
            if let Err(e) = state.messenger.send_html(chat_id, HELP_TEXT).await {
                tracing::error!(chat_id = chat_id.0, "failed to send help: {e}");
            }
        }
        "map" => state.service.send_map(chat_id).await,
        other => {
            tracing::debug!(chat_id = chat_id.0, "unknown command /{other}");
            if let Err(e) = state
                .messenger
                .send_html(chat_id, "Unknown command. Try /menu or /help.")
                .await
            {
                tracing::error!(chat_id = chat_id.0, "failed to send reply: {e}");
            }
        }
    }

    Ok(())
}
