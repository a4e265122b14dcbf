//! Cache system for namespaced key-value caching
//!
//! This crate provides the [`Cache`] facade over a [`KeyValueStore`], the
//! Redis and in-memory stores, and the registry that shares one Redis
//! connection per configuration.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod cache;
pub mod errors;
pub mod memory_store;
pub mod prelude;
pub mod redis_store;
pub mod registry;
pub mod store;
pub mod value;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig};

pub use cache::Cache;
pub use errors::CacheError;
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
pub use registry::ConnectionRegistry;
pub use store::KeyValueStore;
pub use value::CacheValue;
