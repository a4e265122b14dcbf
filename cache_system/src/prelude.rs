//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::cache::Cache;
pub use crate::errors::CacheError;
pub use crate::memory_store::MemoryStore;
pub use crate::redis_store::RedisStore;
pub use crate::registry::ConnectionRegistry;
pub use crate::store::KeyValueStore;
pub use crate::value::CacheValue;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig};

// Common external dependencies
pub use async_trait::async_trait;
pub use redis;
pub use serde::{Deserialize, Serialize};
pub use serde_json::{self, Value, json};
pub use tokio;
