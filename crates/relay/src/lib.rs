//! Push Notification Relay client.
//!
//! Provides typed wire-message parsing, a channel/event binding
//! registry, WebSocket connection management with exponential-backoff
//! reconnection, and a lazily-connected subscriber shared across all
//! subscriptions of one client.

pub mod channels;
pub mod client;
pub mod messages;
pub mod registry;
pub mod subscriber;
