//! Process-wide connection registry
//!
//! Facades built from equal configurations share one [`RedisStore`]. The
//! registry keys stores by a fingerprint of the serialized configuration and
//! never evicts them.

use crate::debug_log;
use crate::errors::CacheError;
use crate::redis_store::RedisStore;
use config::CacheConfig;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, Mutex};

static GLOBAL: LazyLock<ConnectionRegistry> = LazyLock::new(ConnectionRegistry::new);

pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, Arc<RedisStore>>>,
}

impl Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.len())
            .finish()
    }
}

impl ConnectionRegistry {
    /// Create an empty registry, independent from [`ConnectionRegistry::global`]
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// The registry shared by the whole process
    pub fn global() -> &'static ConnectionRegistry {
        &GLOBAL
    }

    /// Generate the lookup key for a configuration
    pub fn fingerprint(config: &CacheConfig) -> Result<String, CacheError> {
        let serialized = serde_json::to_string(config)?;
        let mut hasher = DefaultHasher::new();
        serialized.hash(&mut hasher);
        Ok(format!("{:x}", hasher.finish()))
    }

    /// Return the store for `config`, creating it on first request
    pub fn get(&self, config: &CacheConfig) -> Result<Arc<RedisStore>, CacheError> {
        let fingerprint = Self::fingerprint(config)?;
        let mut connections = self
            .connections
            .lock()
            .map_err(|_| CacheError::Connection("connection registry lock poisoned".into()))?;

        if let Some(store) = connections.get(&fingerprint) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(RedisStore::new(config.clone())?);
        debug_log!(
            "registered connection {} for {}",
            fingerprint,
            config.redacted_url()
        );
        connections.insert(fingerprint, Arc::clone(&store));
        Ok(store)
    }

    /// Number of distinct connections held
    pub fn len(&self) -> usize {
        self.connections.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
