//! Convenience re-exports for common CacheHaus usage
//!
//! # Example
//!
//! ```rust
//! use cachehaus::prelude::*;
//!
//! // Now you have access to Cache, CacheConfig, json! and friends
//! ```

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, ConfigError};

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use async_trait;
pub use tokio;
