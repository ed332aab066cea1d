//! Server configuration module

use clap::Parser;

use crate::config::{
    observability::LoggingConfig, server::ServerRuntimeConfig, stores::StoresConfig,
};

pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod stores;

pub(crate) use observability::LogFormat;

/// Gantry JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "gantry-json", about = "Gantry JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Store backend and pricing settings.
    #[command(flatten)]
    pub stores: StoresConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
