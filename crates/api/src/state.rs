use std::sync::Arc;

use kora_comfyui::api::ComfyUIApi;
use kora_comfyui::client::ComfyUIClient;

use crate::config::ServerConfig;
use crate::templates::Templates;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// HTTP side of the engine API.
    pub api: Arc<ComfyUIApi>,
    /// WebSocket side of the engine API; each request opens its own
    /// connection through this.
    pub client: Arc<ComfyUIClient>,
    /// Outbound client for fetching caller-supplied input images.
    pub http: reqwest::Client,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let api = ComfyUIApi::new(config.engine_api_url())
            .with_submit_timeout(config.submit_timeout());
        let client = ComfyUIClient::new(config.engine_ws_url());
        Self {
            config: Arc::new(config),
            api: Arc::new(api),
            client: Arc::new(client),
            http: reqwest::Client::new(),
            templates: Arc::new(Templates::load()),
        }
    }
}
