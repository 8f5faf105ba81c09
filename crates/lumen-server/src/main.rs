//! lumen API server
//!
//! Main entry point: loads configuration, seeds the simulated platform,
//! wires the stores and the fade coordinator, and serves the REST API.

mod api;
mod config;

use std::sync::Arc;

use anyhow::Result;
use lumen_diagnostics::Reporter;
use lumen_fade::FadeCoordinator;
use lumen_platform::{SimulatedPlatform, TracingNotifier};
use lumen_store::{
    AdaptiveStateRegistry, FadeDriver, FadeWindowTracker, MemoryStore, SnapshotStore,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lumen.yaml".to_string());
    let config = ServerConfig::load(&config_path)?;
    info!(devices = config.devices.len(), "Loaded configuration");

    let platform = Arc::new(SimulatedPlatform::new());
    for device in config.devices.iter().cloned() {
        platform.insert(device.into_device());
    }

    let store = MemoryStore::shared();
    let snapshots = SnapshotStore::new(store.clone());
    let script_windows = FadeWindowTracker::new(store.clone(), FadeDriver::Script);
    let adaptive_windows = FadeWindowTracker::new(store.clone(), FadeDriver::Adaptive);
    let registry = AdaptiveStateRegistry::new(store);

    let coordinator = Arc::new(FadeCoordinator::new(
        platform.clone(),
        platform.clone(),
        snapshots.clone(),
        script_windows.clone(),
        Arc::new(TracingNotifier),
    ));
    let reporter = Arc::new(Reporter::new(
        platform,
        registry.clone(),
        snapshots,
        script_windows,
        adaptive_windows,
    ));

    let app = api::router(api::AppState {
        coordinator,
        reporter,
        registry,
        fade_defaults: config.fade.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(listen = %config.listen, "lumen API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    Ok(())
}
