//! Key-value store abstraction
//!
//! The facade talks to its backend only through [`KeyValueStore`]. Every method
//! takes a fully prefixed key; namespacing and serialization happen above.

use crate::errors::CacheError;
use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// GET
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// SETEX; returns the store's status reply
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<String, CacheError>;

    /// DEL; returns the number of keys removed
    async fn del(&self, key: &str) -> Result<i64, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// TTL in seconds; -1 when the key has no expiry, -2 when it does not exist
    async fn ttl(&self, key: &str) -> Result<i64, CacheError>;

    async fn sadd(&self, key: &str, member: &str) -> Result<i64, CacheError>;

    async fn srem(&self, key: &str, member: &str) -> Result<i64, CacheError>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>, CacheError>;

    /// LPUSH; returns the list length after the push
    async fn lpush(&self, key: &str, item: &str) -> Result<i64, CacheError>;

    /// LREM. `count > 0` removes from head, `count < 0` from tail, 0 removes all.
    async fn lrem(&self, key: &str, count: i64, item: &str) -> Result<i64, CacheError>;

    /// LRANGE with inclusive bounds; negative indices count from the end
    async fn lrange(&self, key: &str, start: isize, stop: isize)
    -> Result<Vec<String>, CacheError>;

    /// GET for every key in one atomic round trip, results in request order
    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError>;
}
