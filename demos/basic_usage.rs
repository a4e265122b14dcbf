//! # Basic Usage Example
//!
//! This example demonstrates the cache facade:
//! - Building a cache from the environment
//! - Strings, JSON values, sets and lists
//! - Batched reads
//! - Sentinel values when something goes wrong
//!
//! Requires a Redis server (REDIS_HOST / REDIS_PORT, default localhost:6379).

use cachehaus::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("CacheHaus Basic Usage Example");
    println!("=============================");

    let cache = Cache::from_env("demo")?;
    println!("Cache: {:?}", cache);

    // 1. Values
    cache.set("greeting", "hello", None).await;
    cache.set("user:1", json!({"name": "Ada", "langs": ["rust"]}), Some(60)).await;

    println!("\nraw greeting:  {:?}", cache.get_raw("greeting").await);
    println!("parsed user:   {:?}", cache.get("user:1").await);
    println!("user ttl:      {:?}", cache.ttl("user:1").await);

    // Plain text is not JSON, so a parsed read gives the sentinel
    println!("parsed greeting: {:?}", cache.get("greeting").await);

    // 2. Sets
    cache.sadd("tags", json!({"tag": "cache"})).await;
    cache.sadd("tags", json!({"tag": "redis"})).await;
    println!("\ntags: {:?}", cache.smembers("tags").await);

    // 3. Lists
    cache.del("recent").await;
    for page in ["/", "/docs", "/blog"] {
        cache.lpush("recent", page).await;
    }
    println!("\nrecent: {:?}", cache.lrange_all("recent").await);
    cache.lrem("recent", "/docs").await;
    println!("after lrem: {:?}", cache.lrange_all("recent").await);

    // 4. Batches
    let users = cache.batch_get(&["user:1", "", "user:2"]).await;
    println!("\nbatch: {:?}", users);

    // 5. Errors stay visible through try_ variants
    if let Err(err) = cache.try_set("bad", json!(42), None).await {
        println!("\ntry_set rejected: {}", err);
    }

    Ok(())
}
