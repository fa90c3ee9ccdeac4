use std::sync::Arc;

use authcode_gate::middleware::{Gate, GateConfig, MemorySessionStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GateConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Refusing to start");
    })?;
    let addr = config.listen_addr();
    tracing::debug!(oauth = ?config.client().config(), "Configuration read");

    let store = Arc::new(MemorySessionStore::new(config.session_ttl()));
    let app = Gate::new(config, store.clone()).router();

    tokio::spawn(purge_sessions(store));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn purge_sessions(store: Arc<MemorySessionStore>) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
    loop {
        interval.tick().await;
        match store.purge_expired() {
            Ok(0) => {}
            Ok(n) => tracing::debug!(purged = n, "Expired sessions dropped"),
            Err(e) => tracing::warn!(error = %e, "Session purge failed"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
