//! Event broker: per-aggregator fan-out of shutdown commands.
//!
//! The broker maps an aggregator UUID to the channels of every stream
//! currently open for it. All registry mutations happen under one lock,
//! held only for the map update itself - never across I/O or a suspension
//! point. Each channel's queue has its own synchronization, so publishing
//! never waits on a reader.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use super::message::EventMessage;

/// Unique identifier for one subscriber channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Generates a new unique channel ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chan-{}", self.0)
    }
}

/// Consumer side of one subscription.
///
/// Owned exclusively by the stream task serving the connection. Messages
/// arrive in publish order and are consumed at most once.
#[derive(Debug)]
pub struct SubscriberChannel {
    id: ChannelId,
    receiver: mpsc::UnboundedReceiver<EventMessage>,
}

impl SubscriberChannel {
    /// Returns this channel's ID.
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Pops the next queued message without waiting.
    pub fn try_pop(&mut self) -> Option<EventMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next message.
    ///
    /// Returns `None` once the channel has been unsubscribed from the
    /// broker and the queue is drained.
    pub async fn pop(&mut self) -> Option<EventMessage> {
        self.receiver.recv().await
    }
}

/// Producer side kept in the registry.
#[derive(Debug)]
struct SubscriberHandle {
    id: ChannelId,
    sender: mpsc::UnboundedSender<EventMessage>,
}

/// Registry of live subscriber channels, keyed by aggregator UUID.
#[derive(Debug, Default)]
pub struct EventBroker {
    subscribers: Mutex<HashMap<String, Vec<SubscriberHandle>>>,
}

impl EventBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new subscriber channel for an aggregator.
    ///
    /// Always succeeds; the broker does not validate that the aggregator
    /// exists (that is the API layer's job). Several channels may be open
    /// for the same aggregator at once, one per connection.
    pub fn subscribe(&self, aggregator_uuid: &str) -> SubscriberChannel {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = ChannelId::generate();

        self.subscribers
            .lock()
            .entry(aggregator_uuid.to_string())
            .or_default()
            .push(SubscriberHandle { id, sender });

        debug!(aggregator = aggregator_uuid, channel = %id, "subscriber registered");
        SubscriberChannel { id, receiver }
    }

    /// Removes a channel from an aggregator's subscriber list.
    ///
    /// Idempotent: a second removal of the same channel is a no-op. Once
    /// the list is empty the aggregator's entry is dropped entirely, so
    /// the registry never accumulates dead keys.
    pub fn unsubscribe(&self, aggregator_uuid: &str, channel: ChannelId) {
        let mut subscribers = self.subscribers.lock();
        if let Some(list) = subscribers.get_mut(aggregator_uuid) {
            list.retain(|handle| handle.id != channel);
            if list.is_empty() {
                subscribers.remove(aggregator_uuid);
                debug!(aggregator = aggregator_uuid, "last subscriber gone, entry removed");
            }
        }
    }

    /// Enqueues a message to every channel subscribed for an aggregator.
    ///
    /// Returns the number of channels the message reached. Zero
    /// subscribers is not an error; the command is simply not delivered.
    /// Appending never blocks on a slow reader.
    pub fn publish(&self, aggregator_uuid: &str, message: EventMessage) -> usize {
        let subscribers = self.subscribers.lock();
        let Some(list) = subscribers.get(aggregator_uuid) else {
            return 0;
        };

        let mut delivered = 0;
        for handle in list {
            // A send fails only if the receiver was dropped before its
            // guard unsubscribed; that channel is unreachable anyway.
            if handle.sender.send(message).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Returns the number of channels subscribed for an aggregator.
    #[must_use]
    pub fn subscriber_count(&self, aggregator_uuid: &str) -> usize {
        self.subscribers
            .lock()
            .get(aggregator_uuid)
            .map_or(0, Vec::len)
    }

    /// Returns whether any aggregator has a live subscriber.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}
