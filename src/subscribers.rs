use crate::errors::AppError;
use crate::models::{timestamp_now, Subscriber};
use crate::storage::{Collection, RecordStore};

/// Chats that receive notifications, keyed by chat id.
#[derive(Debug, Clone)]
pub struct SubscriberRegistry {
    store: RecordStore,
}

impl SubscriberRegistry {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<Subscriber> {
        self.store.read_all(Collection::Subscribers).await
    }

    pub async fn count(&self) -> usize {
        self.list().await.len()
    }

    /// Returns `false` without touching storage when the chat is already subscribed.
    pub async fn add(
        &self,
        chat_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> Result<bool, AppError> {
        let mut subscribers = self.list().await;
        if subscribers.iter().any(|s| s.chat_id == chat_id) {
            return Ok(false);
        }

        subscribers.push(Subscriber {
            chat_id,
            username: or_unknown(username),
            first_name: or_unknown(first_name),
            subscribed_at: timestamp_now(),
        });
        self.store
            .replace(Collection::Subscribers, &subscribers)
            .await?;
        Ok(true)
    }

    pub async fn remove(&self, chat_id: i64) -> Result<bool, AppError> {
        let subscribers = self.list().await;
        let before = subscribers.len();
        let remaining: Vec<_> = subscribers
            .into_iter()
            .filter(|s| s.chat_id != chat_id)
            .collect();

        if remaining.len() == before {
            return Ok(false);
        }
        self.store
            .replace(Collection::Subscribers, &remaining)
            .await?;
        Ok(true)
    }
}

fn or_unknown(value: Option<&str>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(dir: &tempfile::TempDir) -> SubscriberRegistry {
        SubscriberRegistry::new(RecordStore::new(dir.path()))
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        assert!(registry.add(10, Some("ann"), Some("Ann")).await.unwrap());
        assert!(!registry.add(10, Some("other"), None).await.unwrap());

        let subscribers = registry.list().await;
        assert_eq!(subscribers.len(), 1);
        assert_eq!(subscribers[0].username, "ann");
        assert_eq!(subscribers[0].first_name, "Ann");
    }

    #[tokio::test]
    async fn missing_names_default_to_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        registry.add(3, None, Some("")).await.unwrap();
        let subscriber = &registry.list().await[0];
        assert_eq!(subscriber.username, "Unknown");
        assert_eq!(subscriber.first_name, "Unknown");
    }

    #[tokio::test]
    async fn remove_absent_leaves_registry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        registry.add(1, None, None).await.unwrap();
        let before = registry.list().await;

        assert!(!registry.remove(99).await.unwrap());
        assert_eq!(registry.list().await, before);
    }

    #[tokio::test]
    async fn remove_present_drops_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        for id in [1, 2, 3] {
            registry.add(id, None, None).await.unwrap();
        }

        assert!(registry.remove(2).await.unwrap());
        let ids: Vec<_> = registry.list().await.iter().map(|s| s.chat_id).collect();
        assert_eq!(ids, [1, 3]);
    }
}
