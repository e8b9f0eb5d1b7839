use crate::subscribers::SubscriberRegistry;
use crate::telegram::TelegramClient;
use tracing::{error, info, warn};

/// Fans notifications out to every subscriber, one at a time.
#[derive(Debug, Clone)]
pub struct Notifier {
    registry: SubscriberRegistry,
    telegram: TelegramClient,
}

impl Notifier {
    pub fn new(registry: SubscriberRegistry, telegram: TelegramClient) -> Self {
        Self { registry, telegram }
    }

    pub fn registry(&self) -> &SubscriberRegistry {
        &self.registry
    }

    pub fn telegram(&self) -> &TelegramClient {
        &self.telegram
    }

    /// Best-effort delivery. A failure for one subscriber is logged and does
    /// not stop the rest; chats that blocked the bot are unsubscribed.
    pub async fn notify_all(&self, message: &str) {
        let subscribers = self.registry.list().await;
        if subscribers.is_empty() {
            info!("notification (no subscribers): {}", preview(message));
            return;
        }
        if !self.telegram.is_enabled() {
            warn!(
                "bot token not configured, skipping notification to {} subscriber(s)",
                subscribers.len()
            );
            return;
        }

        let mut delivered = 0usize;
        for subscriber in &subscribers {
            match self.telegram.send_message(subscriber.chat_id, message).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    error!("failed to notify {}: {err}", subscriber.chat_id);
                    if err.is_blocked() {
                        match self.registry.remove(subscriber.chat_id).await {
                            Ok(true) => info!("removed blocked subscriber {}", subscriber.chat_id),
                            Ok(false) => {}
                            Err(err) => error!(
                                "failed to remove blocked subscriber {}: {}",
                                subscriber.chat_id, err.message
                            ),
                        }
                    }
                }
            }
        }
        info!(
            "notification delivered to {delivered}/{} subscriber(s)",
            subscribers.len()
        );
    }

    /// Sends a direct reply to one chat.
    pub async fn notify_one(&self, chat_id: i64, message: &str) -> bool {
        match self.telegram.send_message(chat_id, message).await {
            Ok(()) => true,
            Err(err) => {
                error!("telegram message to {chat_id} failed: {err}");
                false
            }
        }
    }
}

fn preview(message: &str) -> String {
    let head: String = message.chars().take(50).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordStore;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier(dir: &tempfile::TempDir, base: &str) -> Notifier {
        let registry = SubscriberRegistry::new(RecordStore::new(dir.path()));
        let telegram = TelegramClient::new(reqwest::Client::new(), base, Some("T".to_string()));
        Notifier::new(registry, telegram)
    }

    fn ok() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} }))
    }

    #[tokio::test]
    async fn empty_registry_makes_no_requests() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        notifier(&dir, &server.uri()).notify_all("hello").await;
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blocked_subscriber_is_removed_and_others_still_receive() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let notifier = notifier(&dir, &server.uri());
        for id in [1, 2, 3] {
            notifier.registry().add(id, None, None).await.unwrap();
        }

        for id in [1, 3] {
            Mock::given(method("POST"))
                .and(path("/botT/sendMessage"))
                .and(body_partial_json(json!({ "chat_id": id, "text": "event" })))
                .respond_with(ok())
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chat_id": 2 })))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .expect(1)
            .mount(&server)
            .await;

        notifier.notify_all("event").await;

        let ids: Vec<_> = notifier.registry().list().await.iter().map(|s| s.chat_id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[tokio::test]
    async fn transient_failure_keeps_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let notifier = notifier(&dir, &server.uri());
        notifier.registry().add(1, None, None).await.unwrap();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        notifier.notify_all("event").await;
        assert_eq!(notifier.registry().count().await, 1);
    }

    #[tokio::test]
    async fn proxy_forbidden_page_keeps_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let notifier = notifier(&dir, &server.uri());
        notifier.registry().add(1, None, None).await.unwrap();

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("<html>Forbidden by proxy</html>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        notifier.notify_all("event").await;
        assert_eq!(notifier.registry().count().await, 1);
    }

    #[tokio::test]
    async fn notify_one_reports_success() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chat_id": 9 })))
            .respond_with(ok())
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chat_id": 10 })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false, "error_code": 400, "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let notifier = notifier(&dir, &server.uri());
        assert!(notifier.notify_one(9, "hi").await);
        assert!(!notifier.notify_one(10, "hi").await);
    }
}
