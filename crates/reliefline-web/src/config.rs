//! Server configuration, loaded from environment variables.

use crate::error::{Result, WebError};
use reliefline_hub::HubConfig;
use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STREAM_BUFFER: usize = 32;
const DEFAULT_STREAM_TTL_SECS: u64 = 30 * 60;

/// Runtime configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// Per-connection event buffer for the notification hub.
    pub stream_buffer: usize,
    /// Stream connections auto-expire after this long.
    pub stream_ttl: Duration,
    /// Issue and log one token per role at startup. Development convenience
    /// for the in-memory identity registry.
    pub seed_dev_tokens: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            stream_buffer: DEFAULT_STREAM_BUFFER,
            stream_ttl: Duration::from_secs(DEFAULT_STREAM_TTL_SECS),
            seed_dev_tokens: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `RELIEFLINE_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("RELIEFLINE_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("RELIEFLINE_PORT") {
            config.port = port
                .parse()
                .map_err(|_| WebError::Config(format!("invalid RELIEFLINE_PORT: {port}")))?;
        }
        if let Ok(origins) = env::var("RELIEFLINE_ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Ok(buffer) = env::var("RELIEFLINE_STREAM_BUFFER") {
            config.stream_buffer = buffer
                .parse()
                .map_err(|_| WebError::Config(format!("invalid RELIEFLINE_STREAM_BUFFER: {buffer}")))?;
        }
        if let Ok(ttl) = env::var("RELIEFLINE_STREAM_TTL_SECS") {
            let secs: u64 = ttl
                .parse()
                .map_err(|_| WebError::Config(format!("invalid RELIEFLINE_STREAM_TTL_SECS: {ttl}")))?;
            config.stream_ttl = Duration::from_secs(secs);
        }
        if let Ok(seed) = env::var("RELIEFLINE_SEED_DEV_TOKENS") {
            config.seed_dev_tokens = matches!(seed.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            channel_buffer: self.stream_buffer,
            connection_ttl: self.stream_ttl,
        }
    }
}
