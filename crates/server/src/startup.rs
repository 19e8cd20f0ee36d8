use std::{env, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use service::EmployeeStore;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port/store-path from configs or env vars, with sensible fallbacks
fn load_config() -> configs::AppConfig {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(_) => {
            let mut cfg = configs::AppConfig::default();
            if let Ok(host) = env::var("SERVER_HOST") {
                cfg.server.host = host;
            }
            if let Some(port) = env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
                cfg.server.port = port;
            }
            cfg.store.normalize_from_env();
            cfg
        }
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config();

    if let Some(parent) = Path::new(&cfg.store.path).parent() {
        if !parent.as_os_str().is_empty() {
            common::env::ensure_data_dir(&parent.to_string_lossy()).await?;
        }
    }

    // The collection document must exist and parse at startup; the process
    // refuses to serve otherwise.
    let store = EmployeeStore::open(&cfg.store.path)
        .await
        .with_context(|| format!("opening employee store at {}", cfg.store.path))?;

    let cors = build_cors();
    let app: Router = routes::build_router(Arc::clone(&store), cors);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, store = %cfg.store.path, "starting employee data server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
