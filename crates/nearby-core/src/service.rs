use std::sync::Arc;

use crate::{
    domain::{ChatId, Coordinate},
    formatting::escape_html,
    map::static_map_url,
    messaging::port::MessagingPort,
    search::FacilitySearch,
    session::LocationBook,
    Error,
};

pub const LOCATION_REQUIRED: &str =
    "Please share your location first using the 📍Update Location button.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error has occured! The developer will be informed";

/// Application boundary between the chat adapter and the search pipeline.
///
/// Owns per-chat location state. Every failure is logged, turned into a
/// generic notice for the user and forwarded to the developer chat.
pub struct NearbyService {
    search: FacilitySearch,
    locations: LocationBook,
    messenger: Arc<dyn MessagingPort>,
    developer_chat: Option<ChatId>,
}

impl NearbyService {
    pub fn new(
        search: FacilitySearch,
        messenger: Arc<dyn MessagingPort>,
        developer_chat: Option<ChatId>,
    ) -> Self {
        Self {
            search,
            locations: LocationBook::new(),
            messenger,
            developer_chat,
        }
    }

    pub async fn update_location(&self, chat_id: ChatId, at: Coordinate) {
        self.locations.set(chat_id, at).await;
        tracing::info!(
            chat_id = chat_id.0,
            "Location updated to {},{}",
            at.latitude(),
            at.longitude()
        );
    }

    /// Search around the chat's last location and reply with the listing.
    pub async fn lookup(&self, chat_id: ChatId, label: &str) {
        let Some(origin) = self.locations.get(chat_id).await else {
            self.reply(chat_id, LOCATION_REQUIRED).await;
            return;
        };

        let listing = match self.search.search(label, origin).await {
            Ok(listing) => listing,
            Err(e) => return self.report_failure(chat_id, label, &e).await,
        };
        // Telegram may still reject the listing (length, markup).
        if let Err(e) = self.messenger.send_html(chat_id, &listing).await {
            self.report_failure(chat_id, label, &e).await;
        }
    }

    /// Send a static map of the chat's last location.
    pub async fn send_map(&self, chat_id: ChatId) {
        let Some(at) = self.locations.get(chat_id).await else {
            self.reply(chat_id, LOCATION_REQUIRED).await;
            return;
        };

        let url = static_map_url(at);
        tracing::info!("Showing img: {url}");
        if let Err(e) = self.messenger.send_photo_url(chat_id, &url).await {
            self.report_failure(chat_id, "/map", &e).await;
        }
    }

    async fn reply(&self, chat_id: ChatId, html: &str) {
        if let Err(e) = self.messenger.send_html(chat_id, html).await {
            tracing::error!(chat_id = chat_id.0, "failed to send reply: {e}");
        }
    }

    async fn report_failure(&self, chat_id: ChatId, query: &str, err: &Error) {
        tracing::error!(chat_id = chat_id.0, query, "Exception while handling an update: {err}");

        self.reply(chat_id, UNEXPECTED_ERROR).await;

        let Some(dev) = self.developer_chat else {
            return;
        };
        let alert = format!(
            "An exception was raised while handling an update\n\
<pre>chat_id = {}\nquery = {}</pre>\n\n<pre>{}</pre>",
            chat_id.0,
            escape_html(query),
            escape_html(&err.to_string())
        );
        if let Err(e) = self.messenger.send_html(dev, &alert).await {
            tracing::error!("failed to alert developer chat: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        credentials::{
            tests::{FakeApi, MemoryStore},
            TokenManager,
        },
        messaging::types::ReplyKeyboard,
        ports::{AccessCredential, LoginCredentials},
        Result,
    };

    #[derive(Default)]
    struct FakeMessenger {
        sends: StdMutex<Vec<(ChatId, String)>>,
        photos: StdMutex<Vec<(ChatId, String)>>,
        /// Number of upcoming `send_html` calls to reject.
        reject_html: StdMutex<usize>,
    }

    impl FakeMessenger {
        fn sent(&self) -> Vec<(ChatId, String)> {
            self.sends.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<()> {
            {
                let mut reject = self.reject_html.lock().unwrap();
                if *reject > 0 {
                    *reject -= 1;
                    return Err(Error::External("message is too long".to_string()));
                }
            }
            self.sends.lock().unwrap().push((chat_id, html.to_string()));
            Ok(())
        }

        async fn send_keyboard(
            &self,
            chat_id: ChatId,
            text: &str,
            _keyboard: ReplyKeyboard,
        ) -> Result<()> {
            self.sends.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }

        async fn send_photo_url(&self, chat_id: ChatId, url: &str) -> Result<()> {
            self.photos.lock().unwrap().push((chat_id, url.to_string()));
            Ok(())
        }
    }

    fn service(api: Arc<FakeApi>, messenger: Arc<FakeMessenger>) -> NearbyService {
        let tokens = Arc::new(TokenManager::new(
            api.clone(),
            Arc::new(MemoryStore::default()),
            LoginCredentials {
                email: "ops@example.com".to_string(),
                password: "hunter2".to_string(),
            },
            AccessCredential::expired(),
        ));
        NearbyService::new(
            FacilitySearch::new(api, tokens),
            messenger,
            Some(ChatId(999)),
        )
    }

    fn here() -> Coordinate {
        Coordinate::new(1.304833, 103.831833).unwrap()
    }

    #[tokio::test]
    async fn asks_for_location_before_searching() {
        let api = Arc::new(FakeApi::default());
        let messenger = Arc::new(FakeMessenger::default());
        let svc = service(api.clone(), messenger.clone());

        svc.lookup(ChatId(1), "Parks").await;

        assert_eq!(messenger.sent(), vec![(ChatId(1), LOCATION_REQUIRED.to_string())]);
        assert_eq!(api.login_calls(), 0);
        assert!(api.search_calls().is_empty());
    }

    #[tokio::test]
    async fn replies_with_listing_for_located_chat() {
        let api = Arc::new(FakeApi::default());
        *api.search_body.lock().unwrap() = Some(json!({"SrchResults": [{"FeatCount": 0}]}));
        let messenger = Arc::new(FakeMessenger::default());
        let svc = service(api, messenger.clone());

        svc.update_location(ChatId(1), here()).await;
        svc.lookup(ChatId(1), "Parks").await;

        assert_eq!(
            messenger.sent(),
            vec![(ChatId(1), "No parks found in a ~2.5km radius".to_string())]
        );
    }

    #[tokio::test]
    async fn locations_do_not_leak_between_chats() {
        let api = Arc::new(FakeApi::default());
        let messenger = Arc::new(FakeMessenger::default());
        let svc = service(api, messenger.clone());

        svc.update_location(ChatId(1), here()).await;
        svc.lookup(ChatId(2), "Parks").await;

        assert_eq!(messenger.sent(), vec![(ChatId(2), LOCATION_REQUIRED.to_string())]);
    }

    #[tokio::test]
    async fn failures_notify_user_and_developer() {
        let api = Arc::new(FakeApi {
            login_error: Some("bad <password>".to_string()),
            ..FakeApi::default()
        });
        let messenger = Arc::new(FakeMessenger::default());
        let svc = service(api, messenger.clone());

        svc.update_location(ChatId(1), here()).await;
        svc.lookup(ChatId(1), "Parks").await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], (ChatId(1), UNEXPECTED_ERROR.to_string()));
        assert_eq!(sent[1].0, ChatId(999));
        assert!(sent[1].1.contains("query = Parks"));
        assert!(sent[1].1.contains("bad &lt;password&gt;"));
    }

    #[tokio::test]
    async fn rejected_listing_notifies_user_and_developer() {
        let api = Arc::new(FakeApi::default());
        *api.search_body.lock().unwrap() = Some(json!({"SrchResults": [
            {"FeatCount": 1},
            {"NAME": "BISHAN PARK", "LatLng": "1.31,103.84"}
        ]}));
        let messenger = Arc::new(FakeMessenger::default());
        *messenger.reject_html.lock().unwrap() = 1;
        let svc = service(api, messenger.clone());

        svc.update_location(ChatId(1), here()).await;
        svc.lookup(ChatId(1), "Parks").await;

        let sent = messenger.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], (ChatId(1), UNEXPECTED_ERROR.to_string()));
        assert_eq!(sent[1].0, ChatId(999));
        assert!(sent[1].1.contains("message is too long"));
    }

    #[tokio::test]
    async fn map_uses_chat_location() {
        let api = Arc::new(FakeApi::default());
        let messenger = Arc::new(FakeMessenger::default());
        let svc = service(api, messenger.clone());

        svc.send_map(ChatId(1)).await;
        assert_eq!(messenger.sent(), vec![(ChatId(1), LOCATION_REQUIRED.to_string())]);

        svc.update_location(ChatId(1), here()).await;
        svc.send_map(ChatId(1)).await;
        let photos = messenger.photos.lock().unwrap().clone();
        assert_eq!(photos.len(), 1);
        assert!(photos[0].1.contains("lat=1.304833&lng=103.831833"));
    }
}
