//! Shutdown-event delivery.
//!
//! A shutdown command issued for an aggregator must reach every streaming
//! connection currently open for it. The pieces:
//!
//! - [`EventBroker`] - registry mapping an aggregator UUID to its live
//!   subscriber channels; owns the concurrency discipline for
//!   registration, fan-out, and teardown
//! - [`SubscriberChannel`] - unbounded, ordered, single-consumer queue
//!   backing one open stream
//! - [`stream::shutdown_events`] - the long-lived SSE handler that drains
//!   a channel onto the wire
//! - [`ShutdownFlags`] - sticky per-aggregator flags backing the
//!   poll-based status endpoint
//!
//! Delivery is at-most-once and best-effort: a command published while no
//! stream is open is dropped, never buffered.

pub mod broker;
pub mod flags;
pub mod message;
pub mod stream;

pub use broker::{ChannelId, EventBroker, SubscriberChannel};
pub use flags::ShutdownFlags;
pub use message::{EventMessage, StreamHandshake};
pub use stream::shutdown_events;
