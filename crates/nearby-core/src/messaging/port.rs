use async_trait::async_trait;

use crate::{
    domain::ChatId,
    messaging::types::ReplyKeyboard,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the bot service only ever talks to
/// this trait so it can be exercised with an in-memory fake.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()>;

    async fn send_keyboard(&self, chat_id: ChatId, text: &str, keyboard: ReplyKeyboard)
        -> Result<()>;

    async fn send_photo_url(&self, chat_id: ChatId, url: &str) -> Result<()>;
}
