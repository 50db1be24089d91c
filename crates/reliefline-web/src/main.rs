// Reliefline server binary.
//
// Wires the in-memory store, lifecycle manager, dispatcher and hub behind
// the HTTP surface and serves until interrupted.

use anyhow::Result;
use reliefline_web::ServerConfig;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit codes for different scenarios
mod exit_codes {
    pub const CONFIG_ERROR: i32 = 1;
    pub const SERVER_ERROR: i32 = 2;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("starting reliefline v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    if let Err(e) = reliefline_web::start_server(&config).await {
        error!("server error: {}", e);
        process::exit(exit_codes::SERVER_ERROR);
    }
}

/// Load server configuration from environment variables.
fn load_configuration() -> Result<ServerConfig> {
    let config = ServerConfig::from_env()?;
    Ok(config)
}
