//! Error types for cache operations
//!
//! This module defines all error types that can occur
//! during cache operations and store interactions.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid key: key must be a non-empty string")]
    InvalidKey,

    #[error("Invalid value: expected a string or an object-like JSON value")]
    InvalidValue,

    #[error("Invalid expire time: {0}")]
    InvalidTtl(u64),

    #[error("WRONGTYPE operation against key {0} holding the wrong kind of value")]
    WrongType(String),
}

impl CacheError {
    /// True for errors raised before the store is contacted
    pub fn is_validation(&self) -> bool {
        matches!(self, CacheError::InvalidKey | CacheError::InvalidValue)
    }
}
