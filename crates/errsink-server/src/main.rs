//! errsink server - remote error-log collector with a browser viewer.

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use errsink_core::{spawn_collector, Collector};
use errsink_server::{config, logging, routes, state};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use config::Config;
use logging::{LogConfig, LogFormat, LogPreset};
use state::AppState;

/// errsink server - collects raw error output over TCP and shows it in a browser.
#[derive(Parser, Debug)]
#[command(name = "errsink-server")]
#[command(about = "Remote error-log collector with a live browser viewer")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override HTTP port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Override collector bind address from config (e.g. 0.0.0.0:4848)
    #[arg(long, value_name = "ADDR")]
    collector_addr: Option<SocketAddr>,

    /// Enable verbose logging (INFO level for all targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "session=debug").
    /// Can be specified multiple times. Targets are prefixed with "errsink::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let preset = LogPreset::from_flags(cli.verbose, cli.debug, cli.trace, cli.quiet);
    logging::init(&LogConfig::new(preset, &cli.log_overrides, cli.log_format));

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(addr) = cli.collector_addr {
        config.collector_addr = addr;
    }

    tracing::info!(
        target: "errsink::startup",
        "Loaded configuration (http port: {}, collector: {}, auto-clear: {})",
        config.port,
        config.collector_addr,
        config.auto_clear
    );

    let state = Arc::new(AppState::new(config.clone()));

    // A collector that cannot bind is the one fatal error
    let collector = Collector::bind(config.collector_addr, state.collector.clone())
        .inspect_err(|e| tracing::error!(target: "errsink::startup", "{}", e))?;
    spawn_collector(collector);

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .nest("/ws", routes::ws_routes())
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.http_addr()?;
    tracing::info!(target: "errsink::startup", "Starting viewer on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind viewer on {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
