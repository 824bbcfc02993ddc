use std::path::PathBuf;
use std::time::Duration;

use kora_provision::engine::EngineConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults matching the standard container layout.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Host:port the engine listens on (default: `127.0.0.1:8188`).
    pub engine_host: String,
    /// Whether this instance spawns and supervises the engine process.
    /// Disable to develop against an already-running engine.
    pub manage_engine: bool,
    /// Interpreter for the engine process (default: `python`).
    pub engine_command: String,
    /// Engine entry script (default: `/comfyui/main.py`).
    pub engine_script: PathBuf,
    /// Weight cache root (default: `/data/models`).
    pub cache_root: PathBuf,
    /// Engine-visible model root, symlinked from the cache
    /// (default: `/comfyui/models`).
    pub serve_root: PathBuf,
    /// Health probe attempts at startup (default: `500`).
    pub health_retries: u32,
    /// Milliseconds between health probes (default: `100`).
    pub health_interval_ms: u64,
    /// Timeout on the workflow submission call, in seconds
    /// (default: `30`).
    pub submit_timeout_secs: u64,
    /// Upper bound on one generation's completion wait, in seconds
    /// (default: `600`).
    pub generation_timeout_secs: u64,
    /// Concurrency ceiling for in-flight requests (default: `5`).
    pub max_concurrent_requests: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default            |
    /// |---------------------------|--------------------|
    /// | `HOST`                    | `0.0.0.0`          |
    /// | `PORT`                    | `3000`             |
    /// | `ENGINE_HOST`             | `127.0.0.1:8188`   |
    /// | `ENGINE_MANAGED`          | `true`             |
    /// | `ENGINE_COMMAND`          | `python`           |
    /// | `ENGINE_SCRIPT`           | `/comfyui/main.py` |
    /// | `MODEL_CACHE_ROOT`        | `/data/models`     |
    /// | `MODEL_SERVE_ROOT`        | `/comfyui/models`  |
    /// | `HEALTH_RETRIES`          | `500`              |
    /// | `HEALTH_INTERVAL_MS`      | `100`              |
    /// | `SUBMIT_TIMEOUT_SECS`     | `30`               |
    /// | `GENERATION_TIMEOUT_SECS` | `600`              |
    /// | `MAX_CONCURRENT_REQUESTS` | `5`                |
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 3000),
            engine_host: env_or("ENGINE_HOST", "127.0.0.1:8188"),
            manage_engine: parse_env("ENGINE_MANAGED", true),
            engine_command: env_or("ENGINE_COMMAND", "python"),
            engine_script: PathBuf::from(env_or("ENGINE_SCRIPT", "/comfyui/main.py")),
            cache_root: PathBuf::from(env_or("MODEL_CACHE_ROOT", "/data/models")),
            serve_root: PathBuf::from(env_or("MODEL_SERVE_ROOT", "/comfyui/models")),
            health_retries: parse_env("HEALTH_RETRIES", 500),
            health_interval_ms: parse_env("HEALTH_INTERVAL_MS", 100),
            submit_timeout_secs: parse_env("SUBMIT_TIMEOUT_SECS", 30),
            generation_timeout_secs: parse_env("GENERATION_TIMEOUT_SECS", 600),
            max_concurrent_requests: parse_env("MAX_CONCURRENT_REQUESTS", 5),
        }
    }

    /// HTTP base URL of the engine.
    pub fn engine_api_url(&self) -> String {
        format!("http://{}", self.engine_host)
    }

    /// WebSocket base URL of the engine.
    pub fn engine_ws_url(&self) -> String {
        format!("ws://{}", self.engine_host)
    }

    /// Timeout on the `/prompt` submission call.
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Bound on one generation's completion wait.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// HTTP request timeout: the generation bound plus headroom for
    /// upload, submission, and artifact fetch.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs + 30)
    }

    /// Engine launch parameters derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        let port = self
            .engine_host
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8188);
        EngineConfig {
            command: self.engine_command.clone(),
            script: self.engine_script.clone(),
            port,
            health_retries: self.health_retries,
            health_interval: Duration::from_millis(self.health_interval_ms),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an env var, falling back to the default only when the var is
/// absent. A present but unparseable value is misconfiguration and
/// panics at startup rather than silently running with the default.
fn parse_env<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("Invalid {key} value '{raw}': {e}")),
        Err(_) => default,
    }
}
