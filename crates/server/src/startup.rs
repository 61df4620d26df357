use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, ServerConfig};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.host, cfg.port).parse()?)
}

/// Router over the configured collection files.
pub fn build_app(cfg: &AppConfig) -> Router {
    routes::build_router(AppState::from_config(&cfg.storage), build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_data_dir(&cfg.storage.data_dir).await?;

    if cfg.storage.serialize_writes {
        info!("per-file write serialization enabled");
    }
    if cfg.storage.strict {
        info!("strict storage mode enabled");
    }

    let app = build_app(&cfg);
    let addr = bind_addr(&cfg.server)?;
    info!(
        %addr,
        products = %cfg.storage.products_path().display(),
        orders = %cfg.storage.orders_path().display(),
        "server is running"
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_from_config() -> anyhow::Result<()> {
        let cfg = ServerConfig { host: "127.0.0.1".into(), port: 3000, worker_threads: None };
        assert_eq!(bind_addr(&cfg)?, "127.0.0.1:3000".parse::<SocketAddr>()?);
        let bad = ServerConfig { host: "not a host".into(), port: 3000, worker_threads: None };
        assert!(bind_addr(&bad).is_err());
        Ok(())
    }
}
