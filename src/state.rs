use crate::config::Config;
use crate::geo::GeoLocator;
use crate::notifier::Notifier;
use crate::storage::RecordStore;
use crate::subscribers::SubscriberRegistry;
use crate::telegram::TelegramClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: RecordStore,
    pub geo: GeoLocator,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::new();
        let store = RecordStore::new(config.data_dir.clone());
        let telegram = TelegramClient::new(
            http.clone(),
            config.telegram_api_base.clone(),
            config.telegram_token.clone(),
        );
        let geo = GeoLocator::new(http, config.geo_api_base.clone(), config.geo_timeout);
        let notifier = Notifier::new(SubscriberRegistry::new(store.clone()), telegram);

        Self {
            config: Arc::new(config),
            store,
            geo,
            notifier,
        }
    }
}
