//! WebSocket client for connecting to the Push Notification Relay.
//!
//! [`RelayClient`] holds the connection configuration; call
//! [`RelayClient::connect`] to establish a live [`RelayConnection`].

use tokio_tungstenite::{connect_async, MaybeTlsStream};

use atelier_core::config::RelayConfig;

/// The raw WebSocket stream type used for relay connections.
pub type WsStream =
    tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for the relay.
pub struct RelayClient {
    config: RelayConfig,
}

/// A live WebSocket connection to the relay.
pub struct RelayConnection {
    /// Locally-generated id correlating log lines for this connection.
    pub session_id: String,
    /// The raw WebSocket stream for reading/writing frames.
    pub ws_stream: WsStream,
}

impl RelayClient {
    /// Create a client for the configured relay application key and
    /// cluster.
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Connect to the relay WebSocket endpoint.
    pub async fn connect(&self) -> Result<RelayConnection, RelayClientError> {
        let url = self.config.ws_url();
        let session_id = uuid::Uuid::new_v4().to_string();

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            RelayClientError::Connection(format!("Failed to connect to relay at {url}: {e}"))
        })?;

        tracing::info!(
            session_id = %session_id,
            cluster = %self.config.cluster,
            "Connected to relay",
        );

        Ok(RelayConnection {
            session_id,
            ws_stream,
        })
    }
}

/// Errors that can occur when working with the relay connection.
///
/// Protocol-level failures on an established connection are reported
/// through [`crate::messages`], not here.
#[derive(Debug, thiserror::Error)]
pub enum RelayClientError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}
