use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{ChatId, Coordinate};

/// Last shared location per chat.
#[derive(Debug, Default)]
pub struct LocationBook {
    inner: Mutex<HashMap<ChatId, Coordinate>>,
}

impl LocationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, chat_id: ChatId, at: Coordinate) {
        self.inner.lock().await.insert(chat_id, at);
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<Coordinate> {
        self.inner.lock().await.get(&chat_id).copied()
    }
}
