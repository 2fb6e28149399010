use std::sync::Arc;

use teloxide::prelude::*;

use nearby_core::domain::{ChatId, Coordinate};

use crate::router::AppState;

pub async fn handle_location(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(loc) = msg.location() else {
        return Ok(());
    };
    let chat_id = ChatId(msg.chat.id.0);

    match Coordinate::new(loc.latitude, loc.longitude) {
        Ok(at) => state.service.update_location(chat_id, at).await,
        Err(e) => tracing::warn!(chat_id = chat_id.0, "ignoring shared location: {e}"),
    }

    Ok(())
}
