use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvBackend {
    Redis,
    Memory,
}

impl FromStr for KvBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(KvBackend::Redis),
            "memory" => Ok(KvBackend::Memory),
            other => Err(format!("unknown backend {other:?}, expected redis or memory")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub kv_backend: KvBackend,
    pub redis_url: String,
    pub route_prefix: String,
    pub admin_token: Option<String>,
}

/// In-memory store with open admin routes, for tests and local runs.
impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            kv_backend: KvBackend::Memory,
            redis_url: "redis://redis:6379".to_string(),
            route_prefix: String::new(),
            admin_token: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            kv_backend: try_load("KV_BACKEND", "redis")?,
            redis_url: try_load("REDIS_URL", "redis://redis:6379")?,
            route_prefix: normalize_prefix(&try_load::<String>("ROUTE_PREFIX", "")?),
            admin_token: read_secret("ADMIN_TOKEN"),
        })
    }
}

/// `"api/"` and `"/api"` both become `"/api"`; blank stays blank.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');

    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
        .filter(|secret| !secret.is_empty())
}
