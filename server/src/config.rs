//! Server configuration parsed from environment variables.

use std::path::PathBuf;

use session::config::env_bool;
use session::{EdgeGuard, EdgeOptions, RouteTable, RouteTableError};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    Port(String),
    #[error("route table {path}: {source}")]
    RouteTable {
        path: PathBuf,
        #[source]
        source: RouteTableError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// JSON protected-route table; the built-in table when unset.
    pub route_table_path: Option<PathBuf>,
    pub reject_expired_tokens: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, route_table_path: None, reject_expired_tokens: false }
    }
}

impl ServerConfig {
    /// Optional:
    /// - `PORT`: default 3000
    /// - `ROUTE_TABLE_PATH`: JSON route table file
    /// - `EDGE_REJECT_EXPIRED`: default false
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Port(raw))?,
            Err(_) => DEFAULT_PORT,
        };
        let route_table_path = std::env::var("ROUTE_TABLE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let reject_expired_tokens = env_bool("EDGE_REJECT_EXPIRED").unwrap_or(false);
        Ok(Self { port, route_table_path, reject_expired_tokens })
    }

    /// # Errors
    ///
    /// Returns an error if the configured route table cannot be loaded.
    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        match &self.route_table_path {
            Some(path) => RouteTable::load(path).map_err(|source| ConfigError::RouteTable { path: path.clone(), source }),
            None => Ok(RouteTable::storefront()),
        }
    }

    /// # Errors
    ///
    /// See [`ServerConfig::route_table`].
    pub fn edge_guard(&self) -> Result<EdgeGuard, ConfigError> {
        let options = EdgeOptions { reject_expired_tokens: self.reject_expired_tokens };
        Ok(EdgeGuard::new(self.route_table()?, options))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
