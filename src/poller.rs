use crate::errors::{AppError, TelegramError};
use crate::messages::{self, StatusCounts};
use crate::notifier::Notifier;
use crate::storage::{Collection, RecordStore};
use crate::telegram::{Message, Update};
use std::time::Duration;
use tracing::{error, info, warn};

const IDLE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Subscribe,
    Unsubscribe,
    Status,
    Help,
}

impl BotCommand {
    /// Exact, case-insensitive match; anything else is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "/start" | "/subscribe" => Some(Self::Subscribe),
            "/stop" | "/unsubscribe" => Some(Self::Unsubscribe),
            "/status" => Some(Self::Status),
            "/help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Long-polls the bot for commands and keeps the subscriber registry in sync.
pub struct BotPoller {
    notifier: Notifier,
    store: RecordStore,
    poll_wait: Duration,
    last_update_id: i64,
}

impl BotPoller {
    /// Resumes from the cursor saved in the data directory.
    pub async fn new(notifier: Notifier, store: RecordStore, poll_wait: Duration) -> Self {
        let last_update_id = store.load_cursor().await;
        Self {
            notifier,
            store,
            poll_wait,
            last_update_id,
        }
    }

    pub fn last_update_id(&self) -> i64 {
        self.last_update_id
    }

    /// Polls until the process exits.
    pub async fn run(mut self) {
        info!(
            "telegram bot polling started at update {}",
            self.last_update_id
        );
        loop {
            self.poll_once().await;
            tokio::time::sleep(IDLE_DELAY).await;
        }
    }

    pub async fn poll_once(&mut self) {
        let updates = match self
            .notifier
            .telegram()
            .get_updates(self.last_update_id + 1, self.poll_wait)
            .await
        {
            Ok(updates) => updates,
            Err(TelegramError::Timeout) => return,
            Err(err) => {
                warn!("telegram polling error: {err}");
                return;
            }
        };
        if updates.is_empty() {
            return;
        }

        for update in &updates {
            self.handle_update(update).await;
        }
        if let Err(err) = self.store.save_cursor(self.last_update_id).await {
            error!("failed to save poll cursor: {}", err.message);
        }
    }

    /// Advances the cursor even for updates that carry no command.
    pub async fn handle_update(&mut self, update: &Update) {
        self.last_update_id = update.update_id;

        let Some(message) = &update.message else {
            return;
        };
        let Some(command) = message.text.as_deref().and_then(BotCommand::parse) else {
            return;
        };
        if let Err(err) = self.handle_command(message, command).await {
            error!("bot command {command:?} failed: {}", err.message);
        }
    }

    async fn handle_command(
        &self,
        message: &Message,
        command: BotCommand,
    ) -> Result<(), AppError> {
        let chat_id = message.chat.id;
        let username = message.from.as_ref().and_then(|u| u.username.as_deref());
        let first_name = message.from.as_ref().and_then(|u| u.first_name.as_deref());
        let registry = self.notifier.registry();

        let reply = match command {
            BotCommand::Subscribe => {
                if registry.add(chat_id, username, first_name).await? {
                    info!(
                        "new subscriber: {} (@{}) - {chat_id}",
                        first_name.unwrap_or("Unknown"),
                        username.unwrap_or("Unknown")
                    );
                    messages::welcome()
                } else {
                    messages::already_subscribed()
                }
            }
            BotCommand::Unsubscribe => {
                if registry.remove(chat_id).await? {
                    info!(
                        "unsubscribed: {} (@{}) - {chat_id}",
                        first_name.unwrap_or("Unknown"),
                        username.unwrap_or("Unknown")
                    );
                    messages::unsubscribed()
                } else {
                    messages::not_subscribed()
                }
            }
            BotCommand::Status => messages::status(self.status_counts().await),
            BotCommand::Help => messages::help(),
        };

        self.notifier.notify_one(chat_id, &reply).await;
        Ok(())
    }

    async fn status_counts(&self) -> StatusCounts {
        StatusCounts {
            visitors: self.store.count(Collection::Visitors).await,
            loan_leads: self.store.count(Collection::LoanLeads).await,
            debt_leads: self.store.count(Collection::DebtLeads).await,
            contact_leads: self.store.count(Collection::ContactLeads).await,
            subscribers: self.notifier.registry().count().await,
        }
    }
}
