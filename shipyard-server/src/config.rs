//! Server configuration loaded from the environment.

use std::fmt;

/// Record store backing the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// PostgreSQL reached through `DATABASE_URL`.
    Postgres {
        /// Connection string.
        database_url: String,
    },
    /// Process-local store; data is lost on restart.
    Memory,
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Postgres { .. } => f.write_str("postgres"),
            StoreConfig::Memory => f.write_str("memory"),
        }
    }
}

/// Listener, CORS and store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Store selection.
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Build the configuration from process environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let host = lookup("SHIPYARD_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("SHIPYARD_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("SHIPYARD_PORT must be a u16 number, got {raw:?}"))?,
            None => 8080,
        };
        let origins = lookup("SHIPYARD_UI_ORIGINS")
            .unwrap_or_else(|| "http://127.0.0.1:4200,http://localhost:4200".to_string());
        let allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
        let store = match lookup("SHIPYARD_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreConfig::Postgres {
                database_url: lookup("DATABASE_URL").ok_or_else(|| {
                    "DATABASE_URL must be set to a PostgreSQL connection string".to_string()
                })?,
            },
            Some("memory") => StoreConfig::Memory,
            Some(other) => {
                return Err(format!(
                    "SHIPYARD_STORE must be `postgres` or `memory`, got {other:?}"
                ));
            }
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            store,
        })
    }
}
