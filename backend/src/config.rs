//! Application configuration.
//!
//! Settings are read from an optional `barbershop.toml` file and then
//! overridden by environment variables:
//!
//! - `HOST`, `PORT`: bind address (default `0.0.0.0:8000`)
//! - `STORE_TYPE`: `local` or `postgres`
//! - `STORE_TIMEOUT_MS`: deadline for each store round-trip (default 5000)
//! - `SEED_DEFAULTS`: seed default services and barbers on startup (default true)
//! - `DATABASE_URL`, `DATABASE_NAME`: Postgres connection settings

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::{PostgresConfig, StoreType};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub postgres: PostgresSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Store selection and behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// `local` or `postgres`; when absent, Postgres is chosen iff a database URL is set.
    #[serde(rename = "type", default)]
    pub store_type: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_type: None,
            timeout_ms: default_timeout_ms(),
            seed_defaults: true,
        }
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSettings {
    #[serde(default)]
    pub database_url: String,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_name: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
            idle_timeout: default_idle_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `barbershop.toml` from the first standard location that has one.
    ///
    /// Searches the current directory, `backend/` and the parent directory.
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from("barbershop.toml"),
            PathBuf::from("backend/barbershop.toml"),
            PathBuf::from("../barbershop.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// File configuration (or defaults) with environment overrides applied.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_default_location()?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup, typically the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_value("PORT", &port)?;
        }
        if let Some(store_type) = lookup("STORE_TYPE") {
            self.store.store_type = Some(store_type);
        }
        if let Some(timeout) = lookup("STORE_TIMEOUT_MS") {
            self.store.timeout_ms = parse_value("STORE_TIMEOUT_MS", &timeout)?;
        }
        if let Some(seed) = lookup("SEED_DEFAULTS") {
            self.store.seed_defaults = parse_bool("SEED_DEFAULTS", &seed)?;
        }
        if let Some(url) = lookup("DATABASE_URL").or_else(|| lookup("PG_DATABASE_URL")) {
            self.postgres.database_url = url;
        }
        if let Some(name) = lookup("DATABASE_NAME") {
            self.postgres.database_name = Some(name);
        }
        Ok(())
    }

    /// Resolve the store backend.
    pub fn store_type(&self) -> Result<StoreType, ConfigError> {
        match self.store.store_type {
            Some(ref raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "store.type".to_string(),
                value: raw.clone(),
            }),
            None if self.database_url_configured() => Ok(StoreType::Postgres),
            None => Ok(StoreType::Local),
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store.timeout_ms)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        parse_value("HOST", &raw)
    }

    pub fn database_url_configured(&self) -> bool {
        !self.postgres.database_url.is_empty()
    }

    pub fn database_name_configured(&self) -> bool {
        self.postgres
            .database_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    /// Postgres connection settings, when a database URL is configured.
    #[cfg(feature = "postgres-repo")]
    pub fn to_postgres_config(&self) -> Option<PostgresConfig> {
        if !self.database_url_configured() {
            return None;
        }
        Some(PostgresConfig {
            database_url: self.postgres.database_url.clone(),
            database_name: self.postgres.database_name.clone(),
            max_pool_size: self.postgres.max_connections,
            min_pool_size: self.postgres.min_connections,
            connection_timeout_sec: self.postgres.connect_timeout,
            idle_timeout_sec: self.postgres.idle_timeout,
            max_retries: self.postgres.max_retries,
            retry_delay_ms: self.postgres.retry_delay_ms,
        })
    }

    /// Postgres connection settings are unavailable when the feature is disabled.
    #[cfg(not(feature = "postgres-repo"))]
    pub fn to_postgres_config(&self) -> Option<PostgresConfig> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store_timeout(), Duration::from_millis(5000));
        assert!(config.store.seed_defaults);
        assert_eq!(config.store_type().unwrap(), StoreType::Local);
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[server]
port = 9090

[store]
type = "local"
timeout_ms = 250
seed_defaults = false
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.store.timeout_ms, 250);
        assert!(!config.store.seed_defaults);
        assert_eq!(config.postgres.max_connections, 10);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("[server]\nport = \"not a number\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("PORT", "8123"),
                ("STORE_TIMEOUT_MS", "100"),
                ("SEED_DEFAULTS", "no"),
                ("DATABASE_NAME", "barbershop"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.store.timeout_ms, 100);
        assert!(!config.store.seed_defaults);
        assert!(config.database_name_configured());
        assert!(!config.database_url_configured());
    }

    #[test]
    fn test_invalid_override_reports_key() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[("DATABASE_URL", "postgres://localhost/shop")]))
            .unwrap();
        assert_eq!(config.store_type().unwrap(), StoreType::Postgres);

        config
            .apply_overrides(lookup(&[("STORE_TYPE", "local")]))
            .unwrap();
        assert_eq!(config.store_type().unwrap(), StoreType::Local);
    }

    #[test]
    fn test_unknown_store_type() {
        let mut config = AppConfig::default();
        config.store.store_type = Some("mongo".to_string());
        assert!(config.store_type().is_err());
    }
}
