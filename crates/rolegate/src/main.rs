//! rolegate - authentication and role-based access control gateway

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use rolegate_api::{AppState, create_router};
use rolegate_auth::JwtManager;
use rolegate_db::Database;

/// rolegate - authentication and role-based access control gateway
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "ROLEGATE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "ROLEGATE_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "ROLEGATE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = Some(secret);
    }

    init_logging(&config.logging);

    info!("Starting rolegate v{}", env!("CARGO_PKG_VERSION"));
    info!("{}", source);

    let secret = config.validate()?;

    // Create the database directory
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Arc::new(Database::new(&db_url).await?);

    // Seed baseline roles and the first admin
    rolegate_core::seed(db.as_ref(), &config.bootstrap).await?;

    let token_ttl = chrono::Duration::try_seconds(config.auth.token_ttl_secs)
        .context("auth.token_ttl_secs is out of range")?;
    let jwt = Arc::new(JwtManager::new(secret, token_ttl));

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    let state = AppState::new(db, jwt);

    let mut app = create_router(state, Some(Arc::new(metrics_handle)));
    if config.server.cors {
        app = app.layer(CorsLayer::permissive());
    }
    let app = app.layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!(
        "Tokens expire after {}s; database at {}",
        config.auth.token_ttl_secs, config.database.path
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
