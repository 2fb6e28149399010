//! Telegram adapter (teloxide).
//!
//! This crate implements the `nearby-core` MessagingPort over Telegram Bot API
//! and routes incoming updates to the `NearbyService`.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ButtonRequest, InputFile, KeyboardMarkup, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use nearby_core::{
    domain::ChatId,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{KeyboardButton, ReplyKeyboard},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    fn markup(keyboard: ReplyKeyboard) -> KeyboardMarkup {
        let rows: Vec<Vec<teloxide::types::KeyboardButton>> = keyboard
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(Self::button).collect())
            .collect();
        KeyboardMarkup::new(rows)
            .resize_keyboard(true)
            .one_time_keyboard(keyboard.one_time)
    }

    fn button(button: KeyboardButton) -> teloxide::types::KeyboardButton {
        match button {
            KeyboardButton::Text(label) => teloxide::types::KeyboardButton::new(label),
            KeyboardButton::RequestLocation(label) => {
                teloxide::types::KeyboardButton::new(label).request(ButtonRequest::Location)
            }
        }
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), html.to_string())
                .parse_mode(ParseMode::Html)
                .disable_web_page_preview(true)
        })
        .await?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: ReplyKeyboard,
    ) -> Result<()> {
        let markup = Self::markup(keyboard);
        self.with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), text.to_string())
                .parse_mode(ParseMode::Html)
                .reply_markup(markup.clone())
        })
        .await?;
        Ok(())
    }

    async fn send_photo_url(&self, chat_id: ChatId, url: &str) -> Result<()> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::External(format!("invalid photo url {url}: {e}")))?;
        let photo = InputFile::url(url);
        self.with_retry(|| self.bot.send_photo(Self::tg_chat(chat_id), photo.clone()))
            .await?;
        Ok(())
    }
}
