//! Engine subprocess supervisor.
//!
//! Spawns the ComfyUI process with its fixed launch flags, discards its
//! output, and polls the health endpoint at a fixed interval until the
//! engine answers or the retry ceiling is exhausted. Readiness is an
//! explicit state machine (Starting -> Ready | Failed); there is no
//! restart-on-crash -- the child is supervised only at startup.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use kora_comfyui::api::ComfyUIApi;

use crate::error::SetupError;

/// Launch parameters for the engine subprocess.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Interpreter used to launch the engine (usually `python`).
    pub command: String,
    /// Path to the engine's entry script.
    pub script: PathBuf,
    /// Port the engine listens on.
    pub port: u16,
    /// Health probe attempts before giving up.
    pub health_retries: u32,
    /// Delay between health probe attempts.
    pub health_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "python".to_string(),
            script: PathBuf::from("/comfyui/main.py"),
            port: 8188,
            health_retries: 500,
            health_interval: Duration::from_millis(100),
        }
    }
}

/// Readiness of the supervised engine process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Spawned, health probe not yet answered.
    Starting,
    /// Health probe answered 200; the engine accepts work.
    Ready,
    /// Retry ceiling exhausted; the instance must not serve.
    Failed,
}

/// A spawned engine child process and its readiness state.
pub struct EngineSupervisor {
    child: Child,
    state: EngineState,
}

impl EngineSupervisor {
    /// Spawn the engine subprocess with its fixed flags, output
    /// discarded. The returned supervisor is in [`EngineState::Starting`]
    /// until [`wait_ready`](Self::wait_ready) resolves.
    pub fn spawn(config: &EngineConfig) -> Result<Self, SetupError> {
        tracing::info!(
            command = %config.command,
            script = %config.script.display(),
            port = config.port,
            "Spawning engine process",
        );

        let child = Command::new(&config.command)
            .arg("-u")
            .arg(&config.script)
            .args(["--disable-auto-launch", "--disable-metadata", "--listen"])
            .args(["--port", &config.port.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(SetupError::Spawn)?;

        Ok(Self {
            child,
            state: EngineState::Starting,
        })
    }

    /// Poll the health endpoint until the engine is reachable.
    ///
    /// Transitions to [`EngineState::Ready`] on success. On exhausting
    /// the retry budget the state becomes [`EngineState::Failed`], the
    /// child is killed, and the error propagates (setup-fatal).
    pub async fn wait_ready(&mut self, api: &ComfyUIApi, config: &EngineConfig) -> Result<(), SetupError> {
        match poll_until_healthy(api, config.health_retries, config.health_interval).await {
            Ok(()) => {
                self.state = EngineState::Ready;
                tracing::info!("Engine is healthy");
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Failed;
                let _ = self.child.start_kill();
                Err(e)
            }
        }
    }

    /// Current readiness state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Kill the engine child process. Used during graceful shutdown.
    pub async fn shutdown(&mut self) {
        tracing::info!("Stopping engine process");
        let _ = self.child.kill().await;
    }
}

/// Probe `GET /system_stats` up to `retries` times, sleeping `interval`
/// between attempts. Any non-200 response or connection failure counts
/// as "not ready yet".
pub async fn poll_until_healthy(
    api: &ComfyUIApi,
    retries: u32,
    interval: Duration,
) -> Result<(), SetupError> {
    for attempt in 1..=retries {
        match api.system_stats().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                tracing::trace!(attempt, error = %e, "Engine not ready yet");
            }
        }
        tokio::time::sleep(interval).await;
    }
    Err(SetupError::NeverHealthy { attempts: retries })
}
