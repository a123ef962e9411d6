mod api;
mod config;
mod storage;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::storage::PostgrestClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("🚀 Starting Guia Ibirá API");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("ERRO: Verifique variáveis de ambiente ({})", e);
            std::process::exit(1);
        }
    };
    info!("📋 Configuration loaded");
    info!("   - Data store: {}", config.store.url);
    info!("   - Store timeout: {:?}", config.store.timeout);
    info!("   - CORS origins: {}", config.cors.allowed_origins.join(", "));

    // Connect the backing store client
    let store = Arc::new(PostgrestClient::new(&config.store.url, config.store.key.clone())?);
    let state = AppState::new(store, config.store.timeout);

    let cors = api::cors_layer(&config.cors.allowed_origins)?;
    let app = api::router(state, cors);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("📡 Available endpoints:");
    info!("   GET  /                                       - Status");
    info!("   GET  /health                                 - Health check");
    info!("   GET  /api/items/{{tabela}}                     - List items");
    info!("   GET  /api/item/{{tabela}}/{{id}}                 - Item detail");
    info!("   GET  /api/avaliacoes/resumo/{{tabela}}         - Ratings summary");
    info!("   GET  /api/avaliacoes/detalhe/{{tabela}}/{{id}}   - Ratings for item");
    info!("   POST /api/avaliar                            - Submit rating");
    info!("   GET  /api/busca?q=                           - Search");

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
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
