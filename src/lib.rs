pub mod app;
pub mod config;
pub mod crawler;
pub mod errors;
pub mod export;
pub mod geo;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod notifier;
pub mod poller;
pub mod state;
pub mod stats;
pub mod storage;
pub mod subscribers;
pub mod telegram;
pub mod user_agent;

pub use app::router;
pub use config::Config;
pub use poller::BotPoller;
pub use state::AppState;
pub use storage::RecordStore;
