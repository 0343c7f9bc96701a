mod api;
mod config;
mod sentiment;
mod storage;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::sentiment::SentimentService;
use crate::storage::{ReviewStore, load_reviews};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting Review Analyzer API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Dataset: {}", config.storage.dataset_path.display());
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Initialize sentiment analyzer
    info!("🧠 Initializing sentiment analyzer...");
    let sentiment = Arc::new(SentimentService::new());
    info!("✅ Sentiment analyzer ready");

    // Load the startup dataset into the in-memory store
    info!("💾 Loading review dataset...");
    let reviews = load_reviews(&config.storage.dataset_path)?;
    info!("✅ Review store ready ({} reviews)", reviews.len());
    let store = Arc::new(ReviewStore::new(reviews));

    // Create application state
    let state = AppState { store, sentiment };

    // Build router
    let app = api::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /health   - Health check");
    info!("   GET  /         - List reviews (location, start_date, end_date)");
    info!("   POST /         - Submit a review (Location, ReviewBody)");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
