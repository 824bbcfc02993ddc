//! WebSocket client for connecting to a ComfyUI instance.
//!
//! [`ComfyUIClient`] holds the connection configuration for the engine
//! instance. Call [`ComfyUIClient::connect`] to establish a fresh
//! [`ComfyUIConnection`] with its own correlation `client_id`; each
//! request gets its own connection so the engine addresses events back
//! to the right subscriber.

use tokio_tungstenite::{connect_async, MaybeTlsStream};

/// Configuration handle for the ComfyUI instance.
pub struct ComfyUIClient {
    ws_url: String,
}

/// A live WebSocket connection to a ComfyUI instance.
pub struct ComfyUIConnection {
    /// Client-generated correlation ID sent during the handshake and
    /// echoed in the `/prompt` submission.
    pub client_id: String,
    /// The raw WebSocket stream for reading event frames.
    pub ws_stream: tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl ComfyUIClient {
    /// Create a new client targeting the engine's WebSocket endpoint.
    ///
    /// * `ws_url` - WebSocket base URL, e.g. `ws://127.0.0.1:8188`.
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// WebSocket base URL.
    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Connect to the ComfyUI WebSocket endpoint.
    ///
    /// Generates a unique `client_id` (UUID v4) and appends it as a
    /// query parameter so that ComfyUI can address messages back to
    /// this specific client.
    pub async fn connect(&self) -> Result<ComfyUIConnection, ComfyUIClientError> {
        let client_id = uuid::Uuid::new_v4().to_string();
        let url = format!("{}/ws?clientId={}", self.ws_url, client_id);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            ComfyUIClientError::Connection(format!(
                "Failed to connect to ComfyUI at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::debug!(
            client_id = %client_id,
            "Connected to ComfyUI at {}",
            self.ws_url,
        );

        Ok(ComfyUIConnection {
            client_id,
            ws_stream,
        })
    }
}

impl ComfyUIConnection {
    /// Close the WebSocket. Errors are ignored; the connection is
    /// per-request and about to be dropped either way.
    pub async fn close(&mut self) {
        let _ = self.ws_stream.close(None).await;
    }
}

/// Errors that can occur when working with the WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIClientError {
    /// Failed to establish the initial WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}
