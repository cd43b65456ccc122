//! # Telemetry Trigger Fan-Out API server
//!
//! Exposes the `TriggerRPCHandler` (`PATCH /redfish/v1/TelemetryService/Triggers`)
//! and the read-only telemetry query endpoints over Axum. Session/task
//! services are wired to local stand-ins (see `local_services`) since the
//! real RPC collaborators are out of scope for this crate.

use std::sync::Arc;

use trigger_fanout_api::{app, config::Config, local_services};
use trigger_fanout_core::{FanOutCoordinator, PluginClient, PluginRegistry};
use trigger_fanout_shared::contracts::InMemoryResourceStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trigger_fanout_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "trigger-fanout-api v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    tracing::info!("configuration loaded successfully");

    let resource_store: Arc<dyn trigger_fanout_shared::contracts::ResourceStore> =
        Arc::new(InMemoryResourceStore::new());
    let session_service = Arc::new(local_services::AllowAllSessionService);
    let task_service = Arc::new(local_services::LoggingTaskService);

    let plugin_client = PluginClient::new(config.plugin.to_client_config())?;
    let coordinator = Arc::new(FanOutCoordinator::new(
        PluginRegistry::new(resource_store.clone()),
        Arc::new(plugin_client),
        task_service.clone(),
    ));

    let state = app::AppState::new(
        config.clone(),
        coordinator,
        resource_store,
        session_service,
        task_service,
    );

    let app = app::build_router(state);

    let bind_addr = config.bind_address();
    tracing::info!("server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");

    Ok(())
}

/// Waits for Ctrl+C so in-flight fan-outs are given a chance to finish
/// before the process exits.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown signal received, shutting down...");
}
