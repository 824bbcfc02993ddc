use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kora_api::config::ServerConfig;
use kora_api::router::build_app_router;
use kora_api::state::AppState;
use kora_core::manifest::flux_klein_manifest;
use kora_provision::engine::EngineSupervisor;
use kora_provision::weights::{hf_token_from_env, provision_models};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kora_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Model weights ---
    let manifest = flux_klein_manifest(&config.cache_root, &config.serve_root);
    let download_client = reqwest::Client::new();
    let token = hf_token_from_env();
    if token.is_none() {
        tracing::warn!("No Hugging Face token in environment; gated downloads will fail");
    }
    provision_models(&download_client, &manifest, token.as_deref())
        .await
        .expect("Model provisioning failed");
    tracing::info!(weights = manifest.len(), "Model weights provisioned");

    // --- App state (engine API handles are needed for the health wait) ---
    let state = AppState::new(config.clone());

    // --- Engine ---
    let mut engine = if config.manage_engine {
        let engine_config = config.engine_config();
        let mut supervisor =
            EngineSupervisor::spawn(&engine_config).expect("Failed to spawn engine process");
        supervisor
            .wait_ready(&state.api, &engine_config)
            .await
            .expect("Engine never became healthy");
        Some(supervisor)
    } else {
        tracing::info!("Engine management disabled, expecting an external engine");
        None
    };

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    if let Some(engine) = engine.as_mut() {
        engine.shutdown().await;
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
