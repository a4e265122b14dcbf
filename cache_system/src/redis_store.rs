//! Redis-backed store
//!
//! One [`RedisStore`] wraps one Redis client and a lazily established
//! multiplexed connection that every clone of the store shares.

use crate::errors::CacheError;
use crate::store::KeyValueStore;
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use config::CacheConfig;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, IntoConnectionInfo};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Redis connection shared by every facade built from the same configuration
#[derive(Clone)]
pub struct RedisStore {
    client: Arc<Client>,
    config: Arc<CacheConfig>,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = {
            match self.connection.try_read() {
                Ok(conn) => {
                    if conn.is_some() {
                        "connected"
                    } else {
                        "no_connection"
                    }
                }
                Err(_) => "lock_error",
            }
        };

        f.debug_struct("RedisStore")
            .field("url", &self.config.redacted_url())
            .field("connected", &connection_status)
            .finish()
    }
}

impl RedisStore {
    /// Open a client for `config`. No network I/O happens until the first command.
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let mut info = (config.host.clone(), config.port).into_connection_info()?;
        info.redis.password = config.password.clone();
        let client = Client::open(info)?;

        debug_log!("opened redis client for {}", config.redacted_url());

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            connection: Arc::new(RwLock::new(None)),
        })
    }

    /// Get or create the multiplexed connection
    async fn get_connection(&self) -> Result<MultiplexedConnection, CacheError> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write().await;

        // Another task may have connected while we waited for the write lock
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        debug_log!("connected to {}", self.config.redacted_url());
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }

    /// Configuration this store was opened with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        trace_log!("GET {}", key);
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<String, CacheError> {
        trace_log!("SETEX {} {}", key, seconds);
        let mut conn = self.get_connection().await?;
        let reply: String = conn.set_ex(key, value, seconds).await?;
        Ok(reply)
    }

    async fn del(&self, key: &str) -> Result<i64, CacheError> {
        trace_log!("DEL {}", key);
        let mut conn = self.get_connection().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        trace_log!("EXISTS {}", key);
        let mut conn = self.get_connection().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ttl(&self, key: &str) -> Result<i64, CacheError> {
        trace_log!("TTL {}", key);
        let mut conn = self.get_connection().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(ttl)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<i64, CacheError> {
        trace_log!("SADD {}", key);
        let mut conn = self.get_connection().await?;
        let added: i64 = conn.sadd(key, member).await?;
        Ok(added)
    }

    async fn srem(&self, key: &str, member: &str) -> Result<i64, CacheError> {
        trace_log!("SREM {}", key);
        let mut conn = self.get_connection().await?;
        let removed: i64 = conn.srem(key, member).await?;
        Ok(removed)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, CacheError> {
        trace_log!("SMEMBERS {}", key);
        let mut conn = self.get_connection().await?;
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn lpush(&self, key: &str, item: &str) -> Result<i64, CacheError> {
        trace_log!("LPUSH {}", key);
        let mut conn = self.get_connection().await?;
        let len: i64 = conn.lpush(key, item).await?;
        Ok(len)
    }

    async fn lrem(&self, key: &str, count: i64, item: &str) -> Result<i64, CacheError> {
        trace_log!("LREM {} {}", key, count);
        let mut conn = self.get_connection().await?;
        let removed: i64 = conn.lrem(key, count as isize, item).await?;
        Ok(removed)
    }

    async fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, CacheError> {
        trace_log!("LRANGE {} {} {}", key, start, stop);
        let mut conn = self.get_connection().await?;
        let items: Vec<String> = conn.lrange(key, start, stop).await?;
        Ok(items)
    }

    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        trace_log!("MULTI GET x{}", keys.len());
        let mut conn = self.get_connection().await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for key in keys {
            pipe.get(key);
        }

        let values: Vec<Option<String>> = pipe.query_async(&mut conn).await?;
        Ok(values)
    }
}
