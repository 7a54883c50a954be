//! API Server
//!
//! Explicit wiring of store, services and middleware, plus the listener loop.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::{
    config::{JackpotConfig, ServerConfig},
    services::{BetService, JackpotService, WinLedger},
    storage::JackpotStore,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

impl AppState {
    /// Wire the services over one shared store
    pub fn new(store: JackpotStore, config: &JackpotConfig) -> Self {
        Self {
            jackpots: JackpotService::new(store.clone()),
            bets: BetService::new(store.clone()),
            ledger: WinLedger::new(store, config.ledger.default_page_size),
        }
    }
}

/// Router with the full middleware stack
pub fn build_app(state: Arc<AppState>, config: &ServerConfig) -> axum::Router {
    create_router(state)
        // Request ID middleware (first for tracing)
        .layer(axum::middleware::from_fn(request_id_middleware))
        // CORS layer (before timeout to handle preflight)
        .layer(create_cors_layer(config.allowed_origins.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        // Tracing layer (last for complete request tracing)
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    config: JackpotConfig,
    store: JackpotStore,
}

impl ApiServer {
    pub fn new(config: JackpotConfig, store: JackpotStore) -> Self {
        Self { config, store }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "jackpot=info,tower_http=info".into()),
            )
            .init();

        let state = Arc::new(AppState::new(self.store.clone(), &self.config));
        let app = build_app(state, &self.config.server);
        let addr = self.get_socket_addr()?;

        info!("Starting jackpot API server on http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped gracefully");
        Ok(())
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.server.host.parse::<std::net::IpAddr>()?,
            self.config.server.port,
        )))
    }

    fn log_server_info(&self) {
        info!("Server configuration:");
        info!("   Data directory: {}", self.config.storage.data_directory);
        info!("   CORS: {:?}", self.config.server.allowed_origins);
        info!("   Request timeout: {}s", self.config.server.request_timeout_secs);
        info!("   Lock timeout: {}ms", self.config.storage.lock_timeout_ms);
        info!("   Default page size: {}", self.config.ledger.default_page_size);

        info!("Available endpoints:");
        info!("   GET  /health          - Health check");
        info!("   POST /jackpots        - Create jackpot");
        info!("   GET  /jackpots        - List jackpots");
        info!("   GET  /jackpots/:id    - Jackpot details");
        info!("   POST /bets            - Place a bet");
        info!("   GET  /wins            - Win history");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
