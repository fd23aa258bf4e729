//! Fixcast server binary.
//!
//! Wires configuration, logging, the broadcast hub and the HTTP server
//! together and runs until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `fixcast.yaml` (or `$FIXCAST_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the hub and start its heartbeat
//! 4. Bind and serve HTTP until shutdown

use std::path::PathBuf;
use std::sync::Arc;

use fixcast_core::{ConfigError, FixcastConfig, Hub, LogFormat, LoggingConfig};
use fixcast_server::{AppState, spawn_server};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "fixcast.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the listener cannot
/// bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);

    info!(
        source = %source,
        host = %config.server.host,
        port = config.server.port,
        heartbeat_interval_secs = config.hub.heartbeat_interval_secs,
        subscriber_buffer = config.hub.subscriber_buffer,
        static_dir = ?config.server.static_dir,
        "Configuration loaded"
    );

    // 3. Create the hub and its heartbeat.
    let hub = Arc::new(Hub::new(&config.hub));
    let heartbeat = hub.spawn_heartbeat(config.hub.heartbeat_interval());

    // 4. Serve.
    let state = Arc::new(AppState::with_config(
        Arc::clone(&hub),
        config.server.clone(),
    ));
    let server = spawn_server(&config.server, state).await?;

    if let Err(e) = server.await {
        error!(error = %e, "Server task failed");
    }

    heartbeat.abort();
    info!("fixcast shutdown complete");

    Ok(())
}

/// Load configuration from the file named by `FIXCAST_CONFIG`, or from
/// `fixcast.yaml` when present, or from defaults plus environment.
fn load_config() -> Result<(FixcastConfig, String), ConfigError> {
    let explicit = std::env::var("FIXCAST_CONFIG").ok().map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if explicit.is_some() || path.exists() {
        let config = FixcastConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((FixcastConfig::from_env()?, String::from("defaults")))
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
