//! Service configuration
//!
//! Read from `TASKS_*` environment variables. Unset or blank variables fall
//! back to defaults that match a local MongoDB on its standard port.

use std::net::SocketAddr;
use std::time::Duration;

use tasks_core::task::MongoTaskStoreConfig;
use thiserror::Error;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "mydb";
pub const DEFAULT_COLLECTION: &str = "tasks";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid value {value:?} for {name}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Which task store to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub store: StoreBackend,
    pub mongo: MongoTaskStoreConfig,
    /// Budget for the store work of a single request
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let listen_addr = match var("TASKS_LISTEN_ADDR") {
            Some(raw) => parse_listen_addr(&raw)?,
            None => parse_listen_addr(DEFAULT_LISTEN_ADDR)?,
        };

        let store = match var("TASKS_STORE") {
            None => StoreBackend::MongoDb,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "mongodb" | "mongo" => StoreBackend::MongoDb,
                "memory" => StoreBackend::Memory,
                _ => return Err(invalid("TASKS_STORE", raw, "expected `mongodb` or `memory`")),
            },
        };

        let request_timeout = match var("TASKS_REQUEST_TIMEOUT_SECS") {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(invalid(
                        "TASKS_REQUEST_TIMEOUT_SECS",
                        raw,
                        "expected a positive number of seconds",
                    ))
                }
            },
        };

        let max_body_bytes = match var("TASKS_MAX_BODY_BYTES") {
            None => DEFAULT_MAX_BODY_BYTES,
            Some(raw) => match raw.parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(invalid(
                        "TASKS_MAX_BODY_BYTES",
                        raw,
                        "expected a positive byte count",
                    ))
                }
            },
        };

        Ok(Self {
            listen_addr,
            store,
            mongo: MongoTaskStoreConfig {
                uri: var("TASKS_MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
                database: var("TASKS_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                collection: var("TASKS_COLLECTION")
                    .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            },
            request_timeout,
            max_body_bytes,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            store: StoreBackend::MongoDb,
            mongo: MongoTaskStoreConfig {
                uri: DEFAULT_MONGODB_URI.to_string(),
                database: DEFAULT_DATABASE.to_string(),
                collection: DEFAULT_COLLECTION.to_string(),
            },
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Accepts a full socket address or a bare `:port`, which binds all
/// interfaces.
fn parse_listen_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    let candidate = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => raw.to_string(),
    };
    candidate
        .parse()
        .map_err(|e: std::net::AddrParseError| invalid("TASKS_LISTEN_ADDR", raw, &e.to_string()))
}

fn invalid(name: &'static str, value: impl Into<String>, reason: &str) -> ConfigError {
    ConfigError {
        name,
        value: value.into(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        let default = Config::default();

        assert_eq!(config.listen_addr, default.listen_addr);
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.store, StoreBackend::MongoDb);
        assert_eq!(config.mongo.uri, "mongodb://localhost:27017");
        assert_eq!(config.mongo.database, "mydb");
        assert_eq!(config.mongo.collection, "tasks");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_body_bytes, 1_048_576);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("TASKS_LISTEN_ADDR", "127.0.0.1:8080"),
            ("TASKS_STORE", "Memory"),
            ("TASKS_MONGODB_URI", "mongodb://db:27017"),
            ("TASKS_DATABASE", "prod"),
            ("TASKS_COLLECTION", "todo"),
            ("TASKS_REQUEST_TIMEOUT_SECS", "2"),
            ("TASKS_MAX_BODY_BYTES", "512"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.mongo.uri, "mongodb://db:27017");
        assert_eq!(config.mongo.database, "prod");
        assert_eq!(config.mongo.collection, "todo");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.max_body_bytes, 512);
    }

    #[test]
    fn test_bare_port_and_blank_values() {
        let config = from_pairs(&[("TASKS_LISTEN_ADDR", ":4000"), ("TASKS_DATABASE", "  ")]).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:4000".parse().unwrap());
        assert_eq!(config.mongo.database, "mydb");
    }

    #[test]
    fn test_invalid_values() {
        let err = from_pairs(&[("TASKS_LISTEN_ADDR", "nowhere")]).unwrap_err();
        assert_eq!(err.name, "TASKS_LISTEN_ADDR");

        let err = from_pairs(&[("TASKS_STORE", "postgres")]).unwrap_err();
        assert_eq!(err.name, "TASKS_STORE");

        let err = from_pairs(&[("TASKS_REQUEST_TIMEOUT_SECS", "0")]).unwrap_err();
        assert_eq!(err.name, "TASKS_REQUEST_TIMEOUT_SECS");

        let err = from_pairs(&[("TASKS_MAX_BODY_BYTES", "lots")]).unwrap_err();
        assert_eq!(err.name, "TASKS_MAX_BODY_BYTES");
        assert!(err.to_string().contains("lots"));
    }
}
