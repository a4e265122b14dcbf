//! # CacheHaus
//!
//! A namespaced cache facade over Redis with JSON value marshalling and
//! expiry management. Facades built from the same configuration share one
//! connection, and no operation ever returns an error: failures read as
//! `None`, `false` or an empty `Vec`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cachehaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CacheConfig::new("localhost".to_string(), 6379).with_expiry(600);
//!     let sessions = Cache::new("sessions", &config)?;
//!
//!     sessions.set("alice", json!({"cart": [1, 2, 3]}), None).await;
//!     let cart = sessions.get("alice").await;
//!     println!("cart: {:?}", cart);
//!
//!     sessions.lpush("recent", "alice").await;
//!     println!("recent: {:?}", sessions.lrange_all("recent").await);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Without a server
//!
//! ```rust
//! use cachehaus::prelude::*;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let cache = Cache::with_store("docs", Arc::new(MemoryStore::new()), 300);
//! cache.set("k", json!({"ok": 1}), None).await;
//! assert_eq!(cache.get("k").await, Some(json!({"ok": 1})));
//! # });
//! ```

pub mod prelude;

// Re-export the main public types for convenience
pub use cache_system::{
    Cache, CacheError, CacheValue, ConnectionRegistry, KeyValueStore, MemoryStore, RedisStore,
};

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, ConfigError};

// Re-export internal crates used by the public API
pub use cache_system;
pub use config;

// Re-export external dependencies used in public API
pub use async_trait;
pub use serde;
pub use serde_json;
