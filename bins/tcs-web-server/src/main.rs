use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tcs_core::{AppConfig, FileReadingStore};
use tcs_web::{create_router, WebState};
use tokio::signal::unix::{signal, SignalKind};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TCS3200 web server starting...");

    let config = AppConfig::load(std::env::args_os().nth(1).map(PathBuf::from))
        .context("Failed to load configuration")?;

    let store = FileReadingStore::new(config.store.path.clone());
    tracing::info!("Reading from {}", store.path().display());

    let state = Arc::new(WebState::new(Arc::new(store), &config.web));
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let mut terminate = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    let addr = config.web.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("🚀 Color page ready at http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let name = tokio::select! {
                _ = tokio::signal::ctrl_c() => "Ctrl+C",
                _ = terminate.recv() => "SIGTERM",
            };
            tracing::info!("Received {}, shutting down...", name);
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
