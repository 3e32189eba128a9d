use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::channel::SubscriberId;
use crate::position::PositionRecord;

/// Receiving end of a channel subscription.
///
/// Records still queued when the subscription is removed are not handed out.
pub struct Subscriber {
    id: SubscriberId,
    rx: mpsc::Receiver<PositionRecord>,
    active: Arc<AtomicBool>,
}

impl Subscriber {
    pub(crate) fn new(
        id: SubscriberId,
        rx: mpsc::Receiver<PositionRecord>,
        active: Arc<AtomicBool>,
    ) -> Self {
        Self { id, rx, active }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next record. Returns `None` once the subscription is removed.
    pub async fn recv(&mut self) -> Option<PositionRecord> {
        let record = self.rx.recv().await?;
        self.is_active().then_some(record)
    }

    pub fn try_recv(&mut self) -> Option<PositionRecord> {
        let record = self.rx.try_recv().ok()?;
        self.is_active().then_some(record)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}
