//! Process configuration read from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";
const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when USE_PERSISTENT_STORES=true")]
    Missing(&'static str),
}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", &bind_raw, e))?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl = match lookup("TOKEN_TTL_SECS") {
            Some(raw) => {
                let secs = raw.parse::<i64>().map_err(|e| invalid("TOKEN_TTL_SECS", &raw, e))?;
                if secs <= 0 {
                    return Err(invalid("TOKEN_TTL_SECS", &raw, "must be positive"));
                }
                Duration::seconds(secs)
            }
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        };

        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| invalid("USE_PERSISTENT_STORES", &raw, "expected true or false"))?,
            None => false,
        };

        let storage = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match lookup("DB_MAX_CONNECTIONS") {
                Some(raw) => match raw.parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    Ok(_) => return Err(invalid("DB_MAX_CONNECTIONS", &raw, "must be positive")),
                    Err(e) => return Err(invalid("DB_MAX_CONNECTIONS", &raw, e)),
                },
                None => DEFAULT_DB_MAX_CONNECTIONS,
            };
            StorageConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            storage,
        })
    }
}

fn invalid(name: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}
