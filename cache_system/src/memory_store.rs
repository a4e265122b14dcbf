//! In-process store
//!
//! [`MemoryStore`] mirrors the Redis semantics the facade relies on: SETEX
//! rejects a zero expiry, type mismatches fail with WRONGTYPE, empty sets and
//! lists disappear, and expired keys are dropped lazily on access. Writes also
//! sweep the whole keyspace, at most once per [`SWEEP_INTERVAL`]. Expiry is
//! measured with tokio's clock so paused-time tests can advance it.

use crate::errors::CacheError;
use crate::store::KeyValueStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Minimum time between two full sweeps of expired keys
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Largest SETEX expiry Redis accepts (the millisecond value must fit an i64)
const MAX_EXPIRY_SECS: u64 = i64::MAX as u64 / 1000;

#[derive(Debug)]
enum Data {
    Str(String),
    Set(HashSet<String>),
    List(VecDeque<String>),
}

#[derive(Debug)]
struct Entry {
    data: Data,
    expires_at: Option<Instant>,
}

impl Entry {
    fn persistent(data: Data) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    swept_at: Mutex<Option<Instant>>,
    commands: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands served so far; a batch counts once
    pub fn command_count(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    /// Keys currently held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lock the keyspace and drop `key` if it has expired
    fn keyspace(&self, key: &str) -> Result<MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.commands.fetch_add(1, Ordering::Relaxed);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::Connection("memory store lock poisoned".to_string()))?;
        purge(&mut entries, key, Instant::now());
        Ok(entries)
    }

    /// Like [`MemoryStore::keyspace`], sweeping expired keys first when due
    fn writable(&self, key: &str) -> Result<MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        let mut entries = self.keyspace(key)?;
        let now = Instant::now();
        let mut swept_at = self
            .swept_at
            .lock()
            .map_err(|_| CacheError::Connection("memory store lock poisoned".to_string()))?;

        if swept_at.is_none_or(|at| now.duration_since(at) >= SWEEP_INTERVAL) {
            entries.retain(|_, e| !e.is_expired(now));
            *swept_at = Some(now);
        }
        Ok(entries)
    }
}

fn purge(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
    if entries.get(key).is_some_and(|e| e.is_expired(now)) {
        entries.remove(key);
    }
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::WrongType(key.to_string())
}

fn read_string(entries: &HashMap<String, Entry>, key: &str) -> Result<Option<String>, CacheError> {
    match entries.get(key).map(|e| &e.data) {
        None => Ok(None),
        Some(Data::Str(s)) => Ok(Some(s.clone())),
        Some(_) => Err(wrong_type(key)),
    }
}

/// Resolve LRANGE bounds against a list of `len` items
fn range_bounds(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.keyspace(key)?;
        read_string(&entries, key)
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<String, CacheError> {
        if seconds == 0 || seconds > MAX_EXPIRY_SECS {
            return Err(CacheError::InvalidTtl(seconds));
        }
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(seconds))
            .ok_or(CacheError::InvalidTtl(seconds))?;

        let mut entries = self.writable(key)?;
        entries.insert(
            key.to_string(),
            Entry {
                data: Data::Str(value.to_string()),
                expires_at: Some(expires_at),
            },
        );
        Ok("OK".to_string())
    }

    async fn del(&self, key: &str) -> Result<i64, CacheError> {
        let mut entries = self.keyspace(key)?;
        Ok(entries.remove(key).map_or(0, |_| 1))
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let entries = self.keyspace(key)?;
        Ok(entries.contains_key(key))
    }

    async fn ttl(&self, key: &str) -> Result<i64, CacheError> {
        let entries = self.keyspace(key)?;
        let ttl = match entries.get(key) {
            None => -2,
            Some(Entry {
                expires_at: None, ..
            }) => -1,
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => {
                let remaining = at.saturating_duration_since(Instant::now()).as_millis() as i64;
                (remaining + 500) / 1000
            }
        };
        Ok(ttl)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<i64, CacheError> {
        let mut entries = self.writable(key)?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::persistent(Data::Set(HashSet::new())));
        match &mut entry.data {
            Data::Set(set) => Ok(i64::from(set.insert(member.to_string()))),
            _ => Err(wrong_type(key)),
        }
    }

    async fn srem(&self, key: &str, member: &str) -> Result<i64, CacheError> {
        let mut entries = self.keyspace(key)?;
        let (removed, now_empty) = match entries.get_mut(key).map(|e| &mut e.data) {
            None => return Ok(0),
            Some(Data::Set(set)) => (set.remove(member), set.is_empty()),
            Some(_) => return Err(wrong_type(key)),
        };
        if now_empty {
            entries.remove(key);
        }
        Ok(i64::from(removed))
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, CacheError> {
        let entries = self.keyspace(key)?;
        match entries.get(key).map(|e| &e.data) {
            None => Ok(Vec::new()),
            Some(Data::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        }
    }

    async fn lpush(&self, key: &str, item: &str) -> Result<i64, CacheError> {
        let mut entries = self.writable(key)?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::persistent(Data::List(VecDeque::new())));
        match &mut entry.data {
            Data::List(list) => {
                list.push_front(item.to_string());
                Ok(list.len() as i64)
            }
            _ => Err(wrong_type(key)),
        }
    }

    async fn lrem(&self, key: &str, count: i64, item: &str) -> Result<i64, CacheError> {
        let mut entries = self.keyspace(key)?;
        let list = match entries.get_mut(key).map(|e| &mut e.data) {
            None => return Ok(0),
            Some(Data::List(list)) => list,
            Some(_) => return Err(wrong_type(key)),
        };

        let limit = if count == 0 {
            usize::MAX
        } else {
            count.unsigned_abs() as usize
        };
        let mut removed = 0usize;

        if count >= 0 {
            let mut i = 0;
            while i < list.len() && removed < limit {
                if list[i] == item {
                    list.remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        } else {
            let mut i = list.len();
            while i > 0 && removed < limit {
                i -= 1;
                if list[i] == item {
                    list.remove(i);
                    removed += 1;
                }
            }
        }

        if list.is_empty() {
            entries.remove(key);
        }
        Ok(removed as i64)
    }

    async fn lrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, CacheError> {
        let entries = self.keyspace(key)?;
        let list = match entries.get(key).map(|e| &e.data) {
            None => return Ok(Vec::new()),
            Some(Data::List(list)) => list,
            Some(_) => return Err(wrong_type(key)),
        };

        Ok(match range_bounds(list.len(), start, stop) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn batch_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, CacheError> {
        self.commands.fetch_add(1, Ordering::Relaxed);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::Connection("memory store lock poisoned".to_string()))?;
        let now = Instant::now();

        keys.iter()
            .map(|key| {
                purge(&mut entries, key, now);
                read_string(&entries, key)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setex_rejects_zero_expiry() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set_ex("k", "v", 0).await,
            Err(CacheError::InvalidTtl(0))
        ));
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_setex_rejects_out_of_range_expiry() {
        let store = MemoryStore::new();
        for seconds in [u64::MAX, MAX_EXPIRY_SECS + 1] {
            assert!(matches!(
                store.set_ex("k", "v", seconds).await,
                Err(CacheError::InvalidTtl(s)) if s == seconds
            ));
        }
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_sweep_expired_keys() {
        let store = MemoryStore::new();
        for i in 0..1000 {
            store.set_ex(&format!("k{}", i), "v", 1).await.unwrap();
        }
        store.sadd("members", "m").await.unwrap();
        assert_eq!(store.len(), 1001);

        tokio::time::advance(Duration::from_secs(5)).await;
        store.set_ex("fresh", "v", 10).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.exists("members").await.unwrap());
        assert_eq!(store.get("fresh").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_runs_at_most_once_per_interval() {
        let store = MemoryStore::new();
        store.lpush("list", "a").await.unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        store.set_ex("short", "v", 1).await.unwrap();

        // sweeps here, before "short" expires
        tokio::time::advance(Duration::from_millis(500)).await;
        store.lpush("list", "b").await.unwrap();

        // "short" has expired but the next sweep is not due yet
        tokio::time::advance(Duration::from_millis(600)).await;
        store.lpush("list", "c").await.unwrap();
        assert_eq!(store.len(), 2);

        tokio::time::advance(Duration::from_millis(400)).await;
        store.lpush("list", "d").await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_and_ttl_codes() {
        let store = MemoryStore::new();
        assert_eq!(store.ttl("k").await.unwrap(), -2);

        store.set_ex("k", "v", 300).await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), 300);

        tokio::time::advance(Duration::from_millis(1400)).await;
        assert_eq!(store.ttl("k").await.unwrap(), 299);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.ttl("k").await.unwrap(), -2);

        store.sadd("s", "m").await.unwrap();
        assert_eq!(store.ttl("s").await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let store = MemoryStore::new();
        store.set_ex("str", "v", 10).await.unwrap();
        store.lpush("list", "a").await.unwrap();

        assert!(matches!(store.sadd("str", "m").await, Err(CacheError::WrongType(_))));
        assert!(matches!(store.get("list").await, Err(CacheError::WrongType(_))));
        assert!(matches!(
            store.lrange("str", 0, -1).await,
            Err(CacheError::WrongType(_))
        ));
        assert!(store.batch_get(&["str".to_string(), "list".to_string()]).await.is_err());
    }

    #[tokio::test]
    async fn test_set_membership() {
        let store = MemoryStore::new();
        assert_eq!(store.sadd("s", "a").await.unwrap(), 1);
        assert_eq!(store.sadd("s", "a").await.unwrap(), 0);
        assert_eq!(store.sadd("s", "b").await.unwrap(), 1);

        let mut members = store.smembers("s").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a", "b"]);

        assert_eq!(store.srem("s", "zzz").await.unwrap(), 0);
        assert_eq!(store.srem("s", "a").await.unwrap(), 1);
        assert_eq!(store.srem("s", "b").await.unwrap(), 1);
        assert!(!store.exists("s").await.unwrap());
    }

    #[tokio::test]
    async fn test_lrange_bounds() {
        let store = MemoryStore::new();
        for item in ["1", "2", "3"] {
            store.lpush("l", item).await.unwrap();
        }

        assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["3", "2", "1"]);
        assert_eq!(store.lrange("l", 1, -1).await.unwrap(), vec!["2", "1"]);
        assert_eq!(store.lrange("l", 1, 1).await.unwrap(), vec!["2"]);
        assert_eq!(store.lrange("l", -2, -1).await.unwrap(), vec!["2", "1"]);
        assert_eq!(store.lrange("l", -100, 100).await.unwrap(), vec!["3", "2", "1"]);
        assert!(store.lrange("l", 2, 1).await.unwrap().is_empty());
        assert!(store.lrange("l", 5, 10).await.unwrap().is_empty());
        assert!(store.lrange("missing", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lrem_count_direction() {
        let store = MemoryStore::new();
        // list: a x b x c x
        for item in ["x", "c", "x", "b", "x", "a"] {
            store.lpush("l", item).await.unwrap();
        }

        assert_eq!(store.lrem("l", 1, "x").await.unwrap(), 1);
        assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["a", "b", "x", "c", "x"]);

        assert_eq!(store.lrem("l", -1, "x").await.unwrap(), 1);
        assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["a", "b", "x", "c"]);

        store.lpush("l", "x").await.unwrap();
        assert_eq!(store.lrem("l", 0, "x").await.unwrap(), 2);
        assert_eq!(store.lrange("l", 0, -1).await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_batch_get_preserves_order() {
        let store = MemoryStore::new();
        store.set_ex("a", "1", 10).await.unwrap();
        store.set_ex("c", "3", 10).await.unwrap();

        let before = store.command_count();
        let values = store
            .batch_get(&["c".to_string(), "b".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(values, vec![Some("3".to_string()), None, Some("1".to_string())]);
        assert_eq!(store.command_count(), before + 1);
    }
}
