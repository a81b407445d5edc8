//! SSE stream handler for shutdown events.
//!
//! One long-lived response per connected aggregator instance. The handler
//! subscribes a fresh channel, acknowledges the connection, then relays
//! queued messages as they arrive, emitting an SSE comment once per tick
//! while idle. The subscription is released by a drop guard, so every way
//! the stream can end - client disconnect, write failure, server shutdown
//! - runs the same cleanup exactly once.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures::Stream;
use tokio::time::timeout;
use tracing::{debug, error, info};

use super::broker::{ChannelId, EventBroker, SubscriberChannel};
use super::message::StreamHandshake;
use crate::state::AppState;

/// Releases a broker slot when the owning stream is dropped.
struct SubscriptionGuard {
    broker: Arc<EventBroker>,
    aggregator_uuid: String,
    channel_id: ChannelId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.broker.unsubscribe(&self.aggregator_uuid, self.channel_id);
        debug!(
            aggregator = %self.aggregator_uuid,
            channel = %self.channel_id,
            "event stream subscription released"
        );
    }
}

/// Shutdown event stream handler.
///
/// GET /shutdown_events/{aggregator_uuid}
pub async fn shutdown_events(
    State(state): State<Arc<AppState>>,
    Path(aggregator_uuid): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let tick = state.config.events.keep_alive();
    let channel = state.broker.subscribe(&aggregator_uuid);
    info!(
        aggregator = %aggregator_uuid,
        channel = %channel.id(),
        "shutdown event stream opened"
    );

    // The guard must exist before the response is handed back: a
    // connection can drop before the stream body is ever polled, and the
    // subscription still has to be released.
    let guard = SubscriptionGuard {
        broker: state.broker.clone(),
        aggregator_uuid,
        channel_id: channel.id(),
    };

    Sse::new(event_stream(guard, channel, tick))
}

/// Builds the event sequence for one subscription.
///
/// Waits on the channel with a tick-long timeout rather than polling, so
/// delivery latency is not bounded by the tick while keep-alives still
/// fire on schedule. The generator owns the guard from construction, so
/// dropping the stream at any point, polled or not, unsubscribes.
fn event_stream(
    guard: SubscriptionGuard,
    mut channel: SubscriberChannel,
    tick: Duration,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream! {
        if let Some(event) = json_event(&StreamHandshake::ready()) {
            yield Ok(event);
        }

        loop {
            match timeout(tick, channel.pop()).await {
                Ok(Some(message)) => {
                    info!(
                        aggregator = %guard.aggregator_uuid,
                        ?message,
                        "delivering event to stream"
                    );
                    if let Some(event) = json_event(&message) {
                        yield Ok(event);
                    }
                }
                // The registry dropped our sender: unregistered externally.
                Ok(None) => break,
                Err(_) => yield Ok(Event::default().comment("keep-alive")),
            }
        }
    }
}

/// Serializes a payload into an SSE data event.
fn json_event<T: serde::Serialize>(payload: &T) -> Option<Event> {
    match serde_json::to_string(payload) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            error!(error = %e, "failed to serialize stream event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::message::EventMessage;
    use futures::StreamExt;

    fn guarded(broker: &Arc<EventBroker>, channel: &SubscriberChannel) -> SubscriptionGuard {
        SubscriptionGuard {
            broker: broker.clone(),
            aggregator_uuid: "agg-1".to_string(),
            channel_id: channel.id(),
        }
    }

    #[tokio::test]
    async fn test_guard_unsubscribes_on_drop() {
        let broker = Arc::new(EventBroker::new());
        let channel = broker.subscribe("agg-1");

        let guard = guarded(&broker, &channel);
        assert_eq!(broker.subscriber_count("agg-1"), 1);

        drop(guard);
        assert_eq!(broker.subscriber_count("agg-1"), 0);
    }

    #[tokio::test]
    async fn test_stream_yields_handshake_then_message() {
        let broker = Arc::new(EventBroker::new());
        let channel = broker.subscribe("agg-1");
        let guard = guarded(&broker, &channel);

        broker.publish("agg-1", EventMessage::Shutdown);

        let stream = event_stream(guard, channel, Duration::from_secs(1));
        futures::pin_mut!(stream);

        // Handshake, then the queued shutdown command.
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());
    }

    #[tokio::test]
    async fn test_stream_drop_releases_subscription() {
        let broker = Arc::new(EventBroker::new());
        let channel = broker.subscribe("agg-1");
        let guard = guarded(&broker, &channel);

        let stream = event_stream(guard, channel, Duration::from_millis(10));
        {
            futures::pin_mut!(stream);
            assert!(stream.next().await.is_some());
            assert_eq!(broker.subscriber_count("agg-1"), 1);
        }

        assert_eq!(broker.subscriber_count("agg-1"), 0);
    }

    #[tokio::test]
    async fn test_unpolled_stream_drop_releases_subscription() {
        let broker = Arc::new(EventBroker::new());
        let channel = broker.subscribe("agg-1");
        let guard = guarded(&broker, &channel);

        // A client can disconnect before the response body is ever
        // polled; the subscription must still be released.
        let stream = event_stream(guard, channel, Duration::from_secs(1));
        assert_eq!(broker.subscriber_count("agg-1"), 1);

        drop(stream);
        assert_eq!(broker.subscriber_count("agg-1"), 0);
    }

    #[tokio::test]
    async fn test_stream_ends_after_external_unsubscribe() {
        let broker = Arc::new(EventBroker::new());
        let channel = broker.subscribe("agg-1");
        let channel_id = channel.id();
        let guard = guarded(&broker, &channel);

        let stream = event_stream(guard, channel, Duration::from_secs(5));
        futures::pin_mut!(stream);
        assert!(stream.next().await.is_some());

        broker.unsubscribe("agg-1", channel_id);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_idle_stream_emits_keep_alive() {
        let broker = Arc::new(EventBroker::new());
        let channel = broker.subscribe("agg-1");
        let guard = guarded(&broker, &channel);

        let stream = event_stream(guard, channel, Duration::from_millis(5));
        futures::pin_mut!(stream);

        // Handshake first, then a keep-alive tick with nothing queued.
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());
    }
}
