//! Apothecary: a web API for openFDA drug label data.
//!
//! This is the application entry point. It loads configuration from an
//! optional TOML file plus the `PORT` environment variable, initializes
//! tracing, creates the openFDA label service with its caches, sets up the
//! Axum router, and starts the HTTP server. Startup failures (bad
//! configuration, port already bound) exit non-zero so the container
//! platform can restart or redeploy the process.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use apothecary::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use apothecary::http::start_server;
use apothecary::openfda::OpenFdaService;
use apothecary::routes::create_router;
use apothecary::state::{AppState, Readiness};

/// Apothecary: a web API for openFDA drug label data
#[derive(Parser, Debug)]
#[command(name = "apothecary", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "apothecary=debug,reqwest=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration before tracing init so the log format knob applies
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    match config.logging.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(
        host = %config.http.host,
        port = config.http.port,
        upstream = %config.openfda.base_url,
        max_retries = config.openfda.max_retries,
        "Loaded configuration"
    );

    // Initialize the openFDA label service with caching and coalescing
    let openfda = OpenFdaService::new(&config)?;
    tracing::info!(
        label_ttl_seconds = config.cache.label_ttl_seconds,
        max_label_sets = config.cache.max_label_sets,
        "Initialized openFDA label service"
    );

    // Create application state and router
    let readiness = Readiness::default();
    let state = AppState::new(config.clone(), openfda, readiness.clone());
    let app = create_router(state);

    // Serve until shutdown; bind failures propagate as a non-zero exit
    start_server(app, &config, readiness).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
