//! Configuration loading and representation.
//!
//! Everything is read from the process environment:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `STOCKFLOW_BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `DATABASE_URL` | unset | SQLite URL (e.g. `sqlite://inventory.db`); unset selects the in-memory store |
//! | `STOCKFLOW_DB_MAX_CONNECTIONS` | `5` | SQLite pool size |

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Which store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Sqlite { url: String, max_connections: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("STOCKFLOW_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "STOCKFLOW_BIND_ADDR",
            message: format!("'{bind_raw}': {e}"),
        })?;

        let max_connections = match lookup("STOCKFLOW_DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "STOCKFLOW_DB_MAX_CONNECTIONS",
                        message: format!("'{raw}' is not a positive integer"),
                    });
                }
            },
        };

        let store = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) if url.starts_with("sqlite:") => StoreBackend::Sqlite { url, max_connections },
            Some(url) => {
                return Err(ConfigError::Invalid {
                    var: "DATABASE_URL",
                    message: format!("'{url}' is not a sqlite: URL"),
                });
            }
            None => StoreBackend::InMemory,
        };

        Ok(Self { bind_addr, store })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_on_8080() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.store, StoreBackend::InMemory);
    }

    #[test]
    fn sqlite_url_selects_sqlite_backend() {
        let cfg = config(&[
            ("DATABASE_URL", "sqlite://inventory.db"),
            ("STOCKFLOW_DB_MAX_CONNECTIONS", "2"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreBackend::Sqlite {
                url: "sqlite://inventory.db".to_string(),
                max_connections: 2,
            }
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("STOCKFLOW_BIND_ADDR", "nope")]).is_err());
        assert!(config(&[("STOCKFLOW_DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config(&[("DATABASE_URL", "postgres://localhost/db")]).is_err());
    }
}
