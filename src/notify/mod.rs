//! In-process publish/subscribe for position updates.
//!
//! Every subscription owns a bounded delivery queue. Publishing never waits on a
//! subscriber: a full queue drops the record for that subscriber only. Handler
//! subscriptions are drained by their own tokio task, channel subscriptions by
//! whatever context the consumer polls the [`Subscriber`] from.

mod channel;
mod subscriber;

pub use channel::{NotificationChannel, SubscriberId, DEFAULT_SUBSCRIBER_BUFFER};
pub use subscriber::Subscriber;
