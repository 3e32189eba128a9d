use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::notify::NotificationChannel;
use crate::poller::{Poller, PollerError};
use crate::position::PositionRecord;
use crate::soap::SoapClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub poller: Arc<Mutex<Poller<SoapClient>>>,
    latest: Arc<StdMutex<Option<PositionRecord>>>,
}

impl AppState {
    /// Build the poller and subscribe the server to its topic.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Self, PollerError> {
        let client = SoapClient::new(config.service.clone())?;
        let channel = NotificationChannel::new(config.poller.subscriber_buffer);
        let poller_config = config.poller.poller_config();

        let latest = Arc::new(StdMutex::new(None));
        let sink = latest.clone();
        channel.subscribe(&poller_config.topic, move |record| {
            *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
        });

        Ok(Self {
            config: Arc::new(config),
            poller: Arc::new(Mutex::new(Poller::new(client, channel, poller_config))),
            latest,
        })
    }

    pub fn latest_position(&self) -> Option<PositionRecord> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
