//! Shared relay subscriber.
//!
//! One [`RelaySubscriber`] owns a single lazily-initialized WebSocket
//! connection shared across all subscriptions, instead of opening a
//! fresh relay connection per subscription call. The connection task is
//! spawned on the first subscribe and runs connect → resubscribe →
//! dispatch → reconnect until [`RelaySubscriber::shutdown`].
//!
//! No result timeout or retry exists: if the relay never publishes on
//! a channel, its callbacks are simply never invoked. The returned
//! [`Subscription`] handle gives callers the lifecycle hook to drop a
//! binding explicitly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use atelier_core::config::RelayConfig;

use crate::client::{RelayClient, RelayConnection};
use crate::messages::{
    parse_message, pong_frame, subscribe_frame, unsubscribe_frame, RelayMessage,
};
use crate::registry::{BindingRegistry, EventCallback};

/// Wait before the first reconnect attempt after a failure.
const BACKOFF_FLOOR: Duration = Duration::from_millis(500);
/// Upper bound on the wait between reconnect attempts.
const BACKOFF_CEILING: Duration = Duration::from_secs(32);

/// Doubling retry schedule: 500ms, 1s, 2s, ... capped at 32s.
///
/// One instance per outage; a successful connection discards it, so the
/// next outage starts back at the floor.
struct Backoff {
    next: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self { next: BACKOFF_FLOOR }
    }

    /// The wait before the next attempt. Each call doubles the
    /// following one, up to the ceiling.
    fn delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(BACKOFF_CEILING);
        delay
    }
}

/// Handle to one channel/event binding.
///
/// Dropping the handle does NOT unbind; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove the binding and
/// release the channel once it has no other bindings.
pub struct Subscription {
    id: Uuid,
    channel: String,
    registry: Arc<BindingRegistry>,
    outbound_tx: mpsc::UnboundedSender<String>,
}

impl Subscription {
    /// The channel this subscription is bound to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Remove the binding. Sends an unsubscribe frame when this was the
    /// last binding on the channel.
    pub fn unsubscribe(self) {
        let channel_empty = self.registry.unbind(&self.channel, self.id);
        if channel_empty {
            let _ = self.outbound_tx.send(unsubscribe_frame(&self.channel));
            tracing::debug!(channel = %self.channel, "Unsubscribed from channel");
        }
    }
}

/// Owns the shared relay connection and its binding registry.
pub struct RelaySubscriber {
    client: Arc<RelayClient>,
    registry: Arc<BindingRegistry>,
    outbound_tx: mpsc::UnboundedSender<String>,
    /// Taken by the connection task on first start.
    outbound_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl RelaySubscriber {
    /// Create a subscriber. No connection is opened until the first
    /// [`subscribe`](Self::subscribe).
    pub fn new(config: RelayConfig) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(RelayClient::new(config)),
            registry: Arc::new(BindingRegistry::new()),
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
            task: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Bind `callback` to `event` on `channel`.
    ///
    /// Starts the shared connection task if it is not running yet. The
    /// callback is invoked on the connection task whenever the relay
    /// publishes a matching event, with the payload passed through
    /// as published.
    pub fn subscribe(
        &self,
        channel: &str,
        event: &str,
        callback: impl Fn(serde_json::Value) + Send + Sync + 'static,
    ) -> Subscription {
        self.ensure_started();

        let callback: EventCallback = Arc::new(callback);
        let (id, first_on_channel) = self.registry.bind(channel, event, callback);
        if first_on_channel {
            let _ = self.outbound_tx.send(subscribe_frame(channel));
        }

        tracing::debug!(channel, event, "Bound result callback");

        Subscription {
            id,
            channel: channel.to_string(),
            registry: Arc::clone(&self.registry),
            outbound_tx: self.outbound_tx.clone(),
        }
    }

    /// Channels that currently have at least one binding.
    pub fn active_channels(&self) -> Vec<String> {
        self.registry.channels()
    }

    /// Cancel the connection task and wait briefly for a clean exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down relay subscriber");
        self.cancel.cancel();

        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    /// Spawn the connection task on first use.
    fn ensure_started(&self) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            return;
        }
        let Some(outbound_rx) = self.outbound_rx.lock().unwrap().take() else {
            // The task already ran and was shut down; a subscriber is
            // single-use by design.
            tracing::warn!("Subscribe after shutdown; binding will never fire");
            return;
        };

        let client = Arc::clone(&self.client);
        let registry = Arc::clone(&self.registry);
        let cancel = self.cancel.clone();

        *task = Some(tokio::spawn(async move {
            tracing::info!("Starting relay connection task");
            run_connection_loop(&client, &registry, outbound_rx, &cancel).await;
            tracing::info!("Relay connection task exited");
        }));
    }
}

/// Core connection loop: connect → resubscribe → process → reconnect.
///
/// Runs until the cancellation token is triggered.
async fn run_connection_loop(
    client: &RelayClient,
    registry: &BindingRegistry,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: &CancellationToken,
) {
    loop {
        let Some(conn) = connect_with_retry(client, cancel).await else {
            return; // cancelled
        };

        let session_id = conn.session_id;
        let (mut sink, mut stream) = conn.ws_stream.split();

        // Re-announce every bound channel on the fresh connection.
        for channel in registry.channels() {
            if let Err(e) = sink.send(Message::text(subscribe_frame(&channel))).await {
                tracing::warn!(session_id = %session_id, error = %e, "Resubscribe send failed");
            }
        }

        // Process inbound frames and queued outbound frames until the
        // connection drops or shutdown is requested.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                Some(frame) = outbound.recv() => {
                    if let Err(e) = sink.send(Message::text(frame)).await {
                        tracing::warn!(session_id = %session_id, error = %e, "Outbound send failed");
                        break;
                    }
                }
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(&text, registry, &mut sink).await;
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Handled automatically by tungstenite.
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(session_id = %session_id, ?frame, "Relay WebSocket closed");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(session_id = %session_id, error = %e, "WebSocket receive error");
                        break;
                    }
                    None => break,
                }
            }
        }

        if cancel.is_cancelled() {
            return;
        }

        tracing::info!(session_id = %session_id, "Connection lost, entering reconnect loop");
        // Fall through: the outer loop reconnects and resubscribes.
    }
}

/// Retry [`RelayClient::connect`] on a doubling delay schedule until it
/// succeeds or shutdown is requested. The first attempt is immediate.
async fn connect_with_retry(
    client: &RelayClient,
    cancel: &CancellationToken,
) -> Option<RelayConnection> {
    let mut backoff = Backoff::new();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match client.connect().await {
            Ok(conn) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Reconnected to relay");
                }
                return Some(conn);
            }
            Err(e) => {
                let delay = backoff.delay();
                tracing::warn!(
                    attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Relay connect failed, retrying",
                );
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}

/// Dispatch a single parsed text frame.
///
/// Generic over the sink so tests can capture reply frames without a
/// live WebSocket.
async fn handle_text_message<S>(text: &str, registry: &BindingRegistry, sink: &mut S)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    match parse_message(text) {
        Ok(msg) => match msg {
            RelayMessage::ChannelEvent {
                channel,
                event,
                data,
            } => {
                let invoked = registry.dispatch(&channel, &event, &data);
                tracing::debug!(channel = %channel, event = %event, invoked, "Channel event");
            }
            RelayMessage::Ping => {
                if let Err(e) = sink.send(Message::text(pong_frame())).await {
                    tracing::warn!(error = %e, "Failed to answer relay ping");
                }
            }
            RelayMessage::ConnectionEstablished {
                socket_id,
                activity_timeout_secs,
            } => {
                tracing::info!(
                    socket_id = %socket_id,
                    ?activity_timeout_secs,
                    "Relay connection established",
                );
            }
            RelayMessage::SubscriptionSucceeded { channel } => {
                tracing::debug!(channel = %channel, "Subscription confirmed");
            }
            RelayMessage::Pong => {}
            RelayMessage::ProtocolError { code, message } => {
                tracing::warn!(?code, message = %message, "Relay protocol error");
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, raw_message = %text, "Failed to parse relay message");
        }
    }
}
