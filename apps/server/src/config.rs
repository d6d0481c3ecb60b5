//! Configuration for the discovery server
//!
//! Layered loading: `{config_dir}/default`, then `{config_dir}/{RUN_ENV}`,
//! then `APP__`-prefixed environment variables (double underscore as the
//! section separator, e.g. `APP__DATABASE__URL`). A `.env` file is honored
//! for local development.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means no permissive CORS headers.
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body size in bytes.
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    /// Run embedded migrations on startup.
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for the crate's own targets (overridable via RUST_LOG).
    pub level: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// One of: daily, hourly, minutely, never.
    pub file_rotation: String,
}

/// Limits for the discovery and autocomplete queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub autocomplete_limit: usize,
    pub autocomplete_min_query_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            max_request_body_size: 1024 * 1024,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/treff".to_string(),
            pool_min_size: 0,
            pool_max_size: 10,
            pool_timeout_seconds: 30,
            run_migrations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "treff-server".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            autocomplete_limit: 10,
            autocomplete_min_query_len: 2,
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    pub fn load(config_dir: &str) -> anyhow::Result<Self> {
        // Best effort; absence of a .env file is fine.
        dotenvy::dotenv().ok();

        let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(&format!("{config_dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{config_dir}/{run_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        // DATABASE_URL is the conventional override and wins over files.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be non-zero".to_string());
        }
        if self.database.url.is_empty() {
            return Err("database.url must be set".to_string());
        }
        if self.database.pool_max_size == 0 {
            return Err("database.pool_max_size must be at least 1".to_string());
        }
        if self.database.pool_min_size > self.database.pool_max_size {
            return Err("database.pool_min_size must not exceed pool_max_size".to_string());
        }
        if self.discovery.default_page_size < 1 {
            return Err("discovery.default_page_size must be at least 1".to_string());
        }
        if self.discovery.max_page_size < self.discovery.default_page_size {
            return Err(
                "discovery.max_page_size must not be below default_page_size".to_string(),
            );
        }
        if self.discovery.autocomplete_limit == 0 {
            return Err("discovery.autocomplete_limit must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid server.host '{}': {e}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.discovery.default_page_size, 20);
        assert_eq!(config.discovery.autocomplete_limit, 10);
    }

    #[test]
    fn rejects_inconsistent_pool_sizes() {
        let mut config = Config::default();
        config.database.pool_min_size = 20;
        config.database.pool_max_size = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn socket_addr_parses_host_and_port() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9000;
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
    }
}
