//! Namespaced cache facade
//!
//! [`Cache`] validates keys and values, prefixes keys with its namespace,
//! encodes values, and delegates to a [`KeyValueStore`].
//!
//! Every operation comes in two forms. The plain form (`get`, `set`, ...)
//! never fails: validation errors, store errors and parse errors all collapse
//! into a sentinel (`None`, `false` or an empty `Vec`) and non-validation
//! errors are logged. The `try_` form returns the underlying [`CacheError`].

use crate::errors::CacheError;
use crate::registry::ConnectionRegistry;
use crate::store::KeyValueStore;
use crate::value::{CacheValue, decode, decode_as};
use crate::debug_log;
use config::{AppConfig, CacheConfig, DEFAULT_EXPIRY};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Clone)]
pub struct Cache {
    namespace: String,
    store: Arc<dyn KeyValueStore>,
    expiry: u64,
}

impl Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("namespace", &self.namespace)
            .field("expiry", &self.expiry)
            .field("store", &self.store)
            .finish()
    }
}

impl Cache {
    /// Create a cache backed by the shared Redis connection for `config`
    pub fn new(namespace: impl Into<String>, config: &CacheConfig) -> Result<Self, CacheError> {
        let store = ConnectionRegistry::global().get(config)?;
        Ok(Self::with_store(namespace, store, config.effective_expiry()))
    }

    /// Create a cache configured from `REDIS_*` / `DEFAULT_CACHE_EXPIRY`
    pub fn from_env(namespace: impl Into<String>) -> Result<Self, CacheError> {
        let config = CacheConfig::from_env()?;
        Self::new(namespace, &config)
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, CacheError> {
        Self::new(config.namespace.clone(), &config.cache)
    }

    /// Create a cache over any store. An expiry of 0 selects the default.
    pub fn with_store(
        namespace: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        expiry: u64,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            store,
            expiry: if expiry == 0 { DEFAULT_EXPIRY } else { expiry },
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Expiry in seconds used by `set` when none is given
    pub fn default_expiry(&self) -> u64 {
        self.expiry
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Key as stored: `namespace:key`
    pub fn prefixed(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    pub fn valid_key(key: &str) -> bool {
        !key.is_empty()
    }

    pub fn valid_key_val(key: &str, value: &CacheValue) -> bool {
        Self::valid_key(key) && value.is_storable()
    }

    fn check_key(key: &str) -> Result<(), CacheError> {
        if Self::valid_key(key) {
            Ok(())
        } else {
            Err(CacheError::InvalidKey)
        }
    }

    /// Validate a key/value pair and return the encoded value
    fn check_key_val(key: &str, value: &CacheValue) -> Result<String, CacheError> {
        Self::check_key(key)?;
        if !value.is_storable() {
            return Err(CacheError::InvalidValue);
        }
        value.encode()
    }

    /// Collapse an error into `None`, logging anything past validation
    fn settle<T>(
        &self,
        operation: &'static str,
        key: &str,
        result: Result<T, CacheError>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) if err.is_validation() => {
                debug_log!("{} rejected in namespace {:?}: {}", operation, self.namespace, err);
                None
            }
            Err(err) => {
                tracing::warn!(
                    operation,
                    namespace = %self.namespace,
                    key,
                    error = %err,
                    "cache operation failed"
                );
                None
            }
        }
    }

    // strings

    pub async fn try_set(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        expiry: Option<u64>,
    ) -> Result<String, CacheError> {
        let encoded = Self::check_key_val(key, &value.into())?;
        let expiry = expiry.unwrap_or(self.expiry);
        self.store.set_ex(&self.prefixed(key), &encoded, expiry).await
    }

    /// Write `value` with `expiry` seconds (default expiry when `None`).
    /// Returns the store's status reply.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        expiry: Option<u64>,
    ) -> Option<String> {
        let result = self.try_set(key, value, expiry).await;
        self.settle("set", key, result)
    }

    pub async fn try_get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        Self::check_key(key)?;
        self.store.get(&self.prefixed(key)).await
    }

    /// Stored text without JSON parsing
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        let result = self.try_get_raw(key).await;
        self.settle("get", key, result).flatten()
    }

    pub async fn try_get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let raw = self.try_get_raw(key).await?;
        raw.map(|s| decode(&s)).transpose()
    }

    /// Stored value parsed as JSON. Text that is not JSON reads as `None`.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let result = self.try_get(key).await;
        self.settle("get", key, result).flatten()
    }

    pub async fn try_get_as<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        let raw = self.try_get_raw(key).await?;
        raw.map(|s| decode_as(&s)).transpose()
    }

    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let result = self.try_get_as(key).await;
        self.settle("get", key, result).flatten()
    }

    pub async fn try_del(&self, key: &str) -> Result<i64, CacheError> {
        Self::check_key(key)?;
        self.store.del(&self.prefixed(key)).await
    }

    /// Delete a key, returning the number of keys removed
    pub async fn del(&self, key: &str) -> Option<i64> {
        let result = self.try_del(key).await;
        self.settle("del", key, result)
    }

    pub async fn try_exists(&self, key: &str) -> Result<bool, CacheError> {
        Self::check_key(key)?;
        self.store.exists(&self.prefixed(key)).await
    }

    pub async fn exists(&self, key: &str) -> bool {
        let result = self.try_exists(key).await;
        self.settle("exists", key, result).unwrap_or(false)
    }

    pub async fn try_ttl(&self, key: &str) -> Result<i64, CacheError> {
        Self::check_key(key)?;
        self.store.ttl(&self.prefixed(key)).await
    }

    /// Seconds to live; -1 without expiry, -2 when the key is missing
    pub async fn ttl(&self, key: &str) -> Option<i64> {
        let result = self.try_ttl(key).await;
        self.settle("ttl", key, result)
    }

    // sets

    pub async fn try_sadd(
        &self,
        key: &str,
        member: impl Into<CacheValue>,
    ) -> Result<i64, CacheError> {
        let encoded = Self::check_key_val(key, &member.into())?;
        self.store.sadd(&self.prefixed(key), &encoded).await
    }

    pub async fn sadd(&self, key: &str, member: impl Into<CacheValue>) -> Option<i64> {
        let result = self.try_sadd(key, member).await;
        self.settle("sadd", key, result)
    }

    pub async fn try_srem(
        &self,
        key: &str,
        member: impl Into<CacheValue>,
    ) -> Result<i64, CacheError> {
        let encoded = Self::check_key_val(key, &member.into())?;
        self.store.srem(&self.prefixed(key), &encoded).await
    }

    /// Remove a member; `Some(0)` when it was not in the set
    pub async fn srem(&self, key: &str, member: impl Into<CacheValue>) -> Option<i64> {
        let result = self.try_srem(key, member).await;
        self.settle("srem", key, result)
    }

    pub async fn try_smembers_raw(&self, key: &str) -> Result<Vec<String>, CacheError> {
        Self::check_key(key)?;
        self.store.smembers(&self.prefixed(key)).await
    }

    pub async fn smembers_raw(&self, key: &str) -> Option<Vec<String>> {
        let result = self.try_smembers_raw(key).await;
        self.settle("smembers", key, result)
    }

    pub async fn try_smembers(&self, key: &str) -> Result<Vec<Value>, CacheError> {
        let members = self.try_smembers_raw(key).await?;
        members.iter().map(|m| decode(m)).collect()
    }

    /// All members parsed as JSON. A single unparseable member makes the
    /// whole result `None`.
    pub async fn smembers(&self, key: &str) -> Option<Vec<Value>> {
        let result = self.try_smembers(key).await;
        self.settle("smembers", key, result)
    }

    // lists

    pub async fn try_lpush(
        &self,
        key: &str,
        item: impl Into<CacheValue>,
    ) -> Result<i64, CacheError> {
        Self::check_key(key)?;
        let encoded = item.into().encode()?;
        self.store.lpush(&self.prefixed(key), &encoded).await
    }

    /// Prepend an item, returning the new list length.
    /// Any JSON value is accepted, scalars included.
    pub async fn lpush(&self, key: &str, item: impl Into<CacheValue>) -> Option<i64> {
        let result = self.try_lpush(key, item).await;
        self.settle("lpush", key, result)
    }

    pub async fn try_lrem_count(
        &self,
        key: &str,
        item: impl Into<CacheValue>,
        count: i64,
    ) -> Result<i64, CacheError> {
        let encoded = Self::check_key_val(key, &item.into())?;
        self.store.lrem(&self.prefixed(key), count, &encoded).await
    }

    /// Remove up to `count` occurrences of `item` (from the tail when
    /// negative, all of them when 0)
    pub async fn lrem_count(
        &self,
        key: &str,
        item: impl Into<CacheValue>,
        count: i64,
    ) -> Option<i64> {
        let result = self.try_lrem_count(key, item, count).await;
        self.settle("lrem", key, result)
    }

    /// Remove every occurrence of `item`
    pub async fn lrem(&self, key: &str, item: impl Into<CacheValue>) -> Option<i64> {
        self.lrem_count(key, item, 0).await
    }

    pub async fn try_lrange(
        &self,
        key: &str,
        start: isize,
        end: isize,
    ) -> Result<Vec<String>, CacheError> {
        Self::check_key(key)?;
        self.store.lrange(&self.prefixed(key), start, end).await
    }

    /// Items `start..=end`; negative indices count from the end.
    /// Empty on invalid key or error.
    pub async fn lrange(&self, key: &str, start: isize, end: isize) -> Vec<String> {
        let result = self.try_lrange(key, start, end).await;
        self.settle("lrange", key, result).unwrap_or_default()
    }

    pub async fn lrange_all(&self, key: &str) -> Vec<String> {
        self.lrange(key, 0, -1).await
    }

    // batches

    fn batch_keys<K: AsRef<str>>(&self, keys: &[K]) -> Vec<String> {
        keys.iter()
            .map(|key| key.as_ref())
            .filter(|key| Self::valid_key(key))
            .map(|key| self.prefixed(key))
            .collect()
    }

    pub async fn try_batch_get_raw<K: AsRef<str>>(
        &self,
        keys: &[K],
    ) -> Result<Vec<Option<String>>, CacheError> {
        let keys = self.batch_keys(keys);
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.store.batch_get(&keys).await
    }

    pub async fn batch_get_raw<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Option<String>> {
        let result = self.try_batch_get_raw(keys).await;
        self.settle("batch_get", "*", result).unwrap_or_default()
    }

    pub async fn try_batch_get<K: AsRef<str>>(
        &self,
        keys: &[K],
    ) -> Result<Vec<Option<Value>>, CacheError> {
        let values = self.try_batch_get_raw(keys).await?;
        values
            .into_iter()
            .map(|v| v.map(|s| decode(&s)).transpose())
            .collect()
    }

    /// Read many keys in one atomic round trip.
    ///
    /// Empty keys are skipped, so results line up with the valid keys in
    /// their original order. Any error, including one unparseable value,
    /// yields an empty `Vec`.
    pub async fn batch_get<K: AsRef<str>>(&self, keys: &[K]) -> Vec<Option<Value>> {
        let result = self.try_batch_get(keys).await;
        self.settle("batch_get", "*", result).unwrap_or_default()
    }
}
