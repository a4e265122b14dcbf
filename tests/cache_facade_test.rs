//! Integration tests for the cache facade over the in-memory store
//!
//! Exercises the public API the way a consumer would: shared stores,
//! concurrent tasks, and configuration loading.

use cachehaus::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn shared_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Order {
    id: u32,
    items: Vec<String>,
    paid: bool,
}

#[tokio::test]
async fn test_round_trip_of_typed_values() {
    let cache = Cache::with_store("orders", shared_store(), 300);
    let order = Order {
        id: 7,
        items: vec!["tea".to_string(), "scone".to_string()],
        paid: false,
    };

    cache
        .set("7", CacheValue::json(&order).unwrap(), None)
        .await
        .unwrap();

    assert_eq!(cache.get_as::<Order>("7").await, Some(order.clone()));
    assert_eq!(
        cache.get("7").await,
        Some(json!({"id": 7, "items": ["tea", "scone"], "paid": false}))
    );
}

#[tokio::test]
async fn test_namespaces_share_a_store_without_colliding() {
    let store = shared_store();
    let a = Cache::with_store("a", store.clone(), 300);
    let b = Cache::with_store("b", store.clone(), 300);

    a.set("k", "v", None).await.unwrap();
    a.sadd("members", "x").await.unwrap();
    a.lpush("queue", "job").await.unwrap();

    assert_eq!(b.get_raw("k").await, None);
    assert_eq!(b.smembers_raw("members").await, Some(vec![]));
    assert!(b.lrange_all("queue").await.is_empty());
    assert_eq!(b.batch_get_raw(&["k"]).await, vec![None]);

    assert_eq!(a.get_raw("k").await.as_deref(), Some("v"));
}

#[tokio::test]
async fn test_concurrent_writers_on_one_store() {
    let store = shared_store();
    let cache = Cache::with_store("jobs", store.clone(), 300);

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache.lpush("queue", format!("job-{}", i)).await;
                cache.sadd("seen", json!({"job": i})).await;
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(cache.lrange_all("queue").await.len(), 32);
    assert_eq!(cache.smembers("seen").await.map(|m| m.len()), Some(32));
}

#[tokio::test(start_paused = true)]
async fn test_ttl_counts_down_and_expires() {
    let cache = Cache::with_store("ttl", shared_store(), 10);
    cache.set("k", "v", None).await.unwrap();
    assert_eq!(cache.ttl("k").await, Some(10));

    tokio::time::advance(Duration::from_secs(4)).await;
    assert_eq!(cache.ttl("k").await, Some(6));

    tokio::time::advance(Duration::from_secs(7)).await;
    assert!(!cache.exists("k").await);
    assert_eq!(cache.ttl("k").await, Some(-2));
    assert_eq!(cache.batch_get_raw(&["k"]).await, vec![None]);
}

#[tokio::test]
async fn test_cache_from_app_config() {
    let app = AppConfig::from_toml_str(
        r#"
        namespace = "sessions"

        [cache]
        host = "localhost"
        port = 6392
        expiry = 90
        "#,
    )
    .unwrap();

    let cache = Cache::from_app_config(&app).unwrap();
    assert_eq!(cache.namespace(), "sessions");
    assert_eq!(cache.default_expiry(), 90);
    assert_eq!(cache.prefixed("alice"), "sessions:alice");

    let again = Cache::new("other", &app.cache).unwrap();
    assert!(Arc::ptr_eq(cache.store(), again.store()));
}
