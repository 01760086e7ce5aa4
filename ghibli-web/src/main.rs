//! ghibli-web - HTTP service for the Ghibli visual search
//!
//! Serves the `/api/*` surface the front-end talks to, plus the `/images/*`
//! and `/thumbnails/*` passthroughs from object storage. All search, vision
//! and text-generation work is delegated to managed backends through the
//! gateway clients in `services/`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ghibli_common::config::ServiceConfig;
use ghibli_web::{build_router, AppState};

/// Command-line arguments for ghibli-web
#[derive(Parser, Debug)]
#[command(name = "ghibli-web")]
#[command(about = "HTTP service for the Ghibli visual search")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "GHIBLI_WEB_PORT")]
    port: Option<u16>,

    /// Path to config TOML
    #[arg(short, long, env = "GHIBLI_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghibli_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ServiceConfig::resolve(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.bind_port = port;
    }

    info!("Starting ghibli-web");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if !config.storage_configured() {
        info!("Object storage not configured, /api/random will serve placeholders");
    }

    let bind_addr = format!("{}:{}", config.bind_host, config.bind_port);
    let state = AppState::new(config).context("Failed to initialize application state")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
