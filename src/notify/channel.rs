use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};

use super::subscriber::Subscriber;
use crate::position::PositionRecord;

pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Subscription {
    id: SubscriberId,
    tx: mpsc::Sender<PositionRecord>,
    active: Arc<AtomicBool>,
}

struct Inner {
    topics: StdMutex<HashMap<String, Vec<Subscription>>>,
    next_id: AtomicU64,
    buffer: usize,
}

/// Topic-based fan-out of [`PositionRecord`]s. Cloning shares the same registry.
#[derive(Clone)]
pub struct NotificationChannel {
    inner: Arc<Inner>,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

impl NotificationChannel {
    /// `buffer` is the per-subscriber queue capacity (at least 1).
    pub fn new(buffer: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                topics: StdMutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
            }),
        }
    }

    /// Register `handler` for every record published on `topic`.
    ///
    /// The handler runs on a delivery task of its own, one record at a time, in
    /// publish order. Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, topic: &str, mut handler: F) -> SubscriberId
    where
        F: FnMut(PositionRecord) + Send + 'static,
    {
        let (id, rx, active) = self.register(topic);

        tokio::spawn(async move {
            let mut rx = rx;
            while let Some(record) = rx.recv().await {
                if !active.load(Ordering::Acquire) {
                    break;
                }
                handler(record);
            }
            log::debug!("Delivery task for {} finished", id);
        });

        id
    }

    /// Register a subscription drained by the caller instead of a handler.
    pub fn subscribe_channel(&self, topic: &str) -> Subscriber {
        let (id, rx, active) = self.register(topic);
        Subscriber::new(id, rx, active)
    }

    /// Remove a subscription. Returns whether it was registered on `topic`.
    pub fn unsubscribe(&self, topic: &str, id: SubscriberId) -> bool {
        let mut topics = self.topics();
        let Some(subscriptions) = topics.get_mut(topic) else {
            return false;
        };

        let Some(pos) = subscriptions.iter().position(|s| s.id == id) else {
            return false;
        };
        let removed = subscriptions.remove(pos);
        removed.active.store(false, Ordering::Release);

        if subscriptions.is_empty() {
            topics.remove(topic);
        }
        log::debug!("Unsubscribed {} from '{}'", id, topic);
        true
    }

    /// Hand `record` to every subscription currently registered on `topic`.
    ///
    /// Returns the number of subscriptions the record was queued for. Never blocks.
    pub fn publish(&self, topic: &str, record: PositionRecord) -> usize {
        let mut topics = self.topics();
        let Some(subscriptions) = topics.get_mut(topic) else {
            log::trace!("No subscribers on '{}', dropping record", topic);
            return 0;
        };

        let mut delivered = 0;
        subscriptions.retain(|sub| match sub.tx.try_send(record.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                log::warn!("Subscriber {} on '{}' is lagging, record dropped", sub.id, topic);
                true
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("Subscriber {} on '{}' went away, removing", sub.id, topic);
                sub.active.store(false, Ordering::Release);
                false
            }
        });

        if subscriptions.is_empty() {
            topics.remove(topic);
        }
        delivered
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics().get(topic).map_or(0, Vec::len)
    }

    fn register(
        &self,
        topic: &str,
    ) -> (SubscriberId, mpsc::Receiver<PositionRecord>, Arc<AtomicBool>) {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        let active = Arc::new(AtomicBool::new(true));

        self.topics()
            .entry(topic.to_string())
            .or_default()
            .push(Subscription {
                id,
                tx,
                active: active.clone(),
            });
        log::debug!("Subscribed {} to '{}'", id, topic);

        (id, rx, active)
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<String, Vec<Subscription>>> {
        self.inner
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
