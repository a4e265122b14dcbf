//! # Configuration Management for CacheHaus
//!
//! This crate provides the connection settings used by the cache facade:
//! store endpoint, credentials and the default expiry applied to writes.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::CacheConfig;
//!
//! let cache_config = CacheConfig::new("localhost".to_string(), 6379)
//!     .with_password("secret")
//!     .with_expiry(600);
//! assert_eq!(cache_config.expiry, 600);
//! ```
//!
//! ### Environment Configuration
//! ```text
//! REDIS_HOST=localhost
//! REDIS_PORT=6379
//! REDIS_PASSWORD=secret
//! DEFAULT_CACHE_EXPIRY=300
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! namespace = "sessions"
//!
//! [cache]
//! host = "localhost"
//! port = 6379
//! password = "secret"
//! expiry = 300
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from cachehaus.toml (or the path in CACHEHAUS_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./cachehaus.toml";

/// Default store host
pub const DEFAULT_HOST: &str = "localhost";
/// Default store port
pub const DEFAULT_PORT: u16 = 6379;
/// Default expiry for written keys, in seconds
pub const DEFAULT_EXPIRY: u64 = 300;

pub const ENV_HOST: &str = "REDIS_HOST";
pub const ENV_PORT: &str = "REDIS_PORT";
pub const ENV_PASSWORD: &str = "REDIS_PASSWORD";
pub const ENV_EXPIRY: &str = "DEFAULT_CACHE_EXPIRY";
pub const ENV_CONFIG_PATH: &str = "CACHEHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Namespace prefixed to every key written through the facade
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Store connection configuration
///
/// Two facades built from equal configurations share one connection, so the
/// field set here is also what identifies a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    /// Default expiry in seconds; 0 means "use DEFAULT_EXPIRY"
    pub expiry: u64,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        load_dotenv()?;

        // Path from CACHEHAUS_CONFIG takes precedence
        if let Ok(config_path) = env::var(ENV_CONFIG_PATH) {
            Self::from_file(&config_path)
        }
        // Then the default location
        else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        }
        // Neither present
        else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                ENV_CONFIG_PATH, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.cache.validate()?;
        Ok(config)
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            password: None,
            expiry: DEFAULT_EXPIRY,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_expiry(mut self, expiry: u64) -> Self {
        self.expiry = expiry;
        self
    }

    /// Build configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv()?;
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to defaults. An expiry that is not a positive
    /// integer also falls back to [`DEFAULT_EXPIRY`]; a malformed port is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(ENV_HOST)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(ENV_PORT).filter(|p| !p.is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ConfigError::Invalid(format!("{} is not a valid port: {}", ENV_PORT, raw))
            })?,
            None => DEFAULT_PORT,
        };

        let password = lookup(ENV_PASSWORD).filter(|p| !p.is_empty());

        let expiry = lookup(ENV_EXPIRY)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|e| *e > 0)
            .unwrap_or(DEFAULT_EXPIRY);

        let config = Self {
            host,
            port,
            password,
            expiry,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("Store host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("Store port cannot be zero".to_string()));
        }
        Ok(())
    }

    /// Expiry applied when a write does not specify one
    pub fn effective_expiry(&self) -> u64 {
        if self.expiry == 0 {
            DEFAULT_EXPIRY
        } else {
            self.expiry
        }
    }

    /// Connection URL with the password masked, safe to log
    pub fn redacted_url(&self) -> String {
        match self.password {
            Some(_) => format!("redis://:***@{}:{}", self.host, self.port),
            None => format!("redis://{}:{}", self.host, self.port),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST.to_string(), DEFAULT_PORT)
    }
}

fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
