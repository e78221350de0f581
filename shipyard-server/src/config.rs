//! Server configuration loaded from the environment.

use std::io;
use std::str::FromStr;

/// Which ship store backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL reached through `DATABASE_URL`.
    Postgres {
        /// Connection string.
        database_url: String,
        /// Maximum pooled connections.
        pool_size: u32,
    },
    /// Process-local store, lost on restart.
    Memory,
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Selected store.
    pub store: StoreBackend,
}

impl ServerConfig {
    /// Build server config from environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> io::Result<Self> {
        let host = lookup("SHIPYARD_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "SHIPYARD_PORT", 8080u16)?;
        let allowed_origins = lookup("SHIPYARD_ORIGINS")
            .unwrap_or_else(|| "http://127.0.0.1:4200,http://localhost:4200".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let mode = lookup("SHIPYARD_STORE").unwrap_or_else(|| "postgres".to_string());
        let store = if mode.eq_ignore_ascii_case("memory") {
            StoreBackend::Memory
        } else if mode.eq_ignore_ascii_case("postgres") {
            let database_url = lookup("DATABASE_URL").ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "DATABASE_URL must be set to a PostgreSQL connection string",
                )
            })?;
            StoreBackend::Postgres {
                database_url,
                pool_size: parse_var(&lookup, "SHIPYARD_POOL_SIZE", 10u32)?,
            }
        } else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("SHIPYARD_STORE must be `postgres` or `memory`, got `{mode}`"),
            ));
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            store,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> io::Result<T> {
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{key} has an invalid value: {raw}"),
            )
        }),
        None => Ok(default),
    }
}
