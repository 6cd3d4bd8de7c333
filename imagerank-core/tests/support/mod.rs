#![allow(dead_code)]

use imagerank_core::{RankingKeys, RedisRankingStore, RedisStoreOptions, WriteMode};
use std::{num::NonZeroUsize, time::Duration};
use uuid::Uuid;

pub fn limit(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("limit must be non-zero")
}

/// Redis server used by live tests; they are skipped when unset.
pub fn live_redis_url() -> Option<String> {
    std::env::var("IMAGERANK_TEST_REDIS_URL").ok()
}

/// Keys unique to one test so parallel tests never share a ranking.
pub fn isolated_keys() -> RankingKeys {
    let suffix = Uuid::new_v4().simple().to_string();
    RankingKeys::new(format!("test-{suffix}"), format!("test-{suffix}:ranking"))
}

pub fn live_store(url: &str, write_mode: WriteMode) -> RedisRankingStore {
    let options = RedisStoreOptions {
        keys: isolated_keys(),
        write_mode,
        connect_timeout: Duration::from_secs(2),
        command_timeout: Duration::from_secs(2),
    };
    RedisRankingStore::open(url, options).expect("valid redis url")
}

/// Writes `value` under `key` with a plain `SET`, bypassing the store.
pub async fn set_raw(url: &str, key: &str, value: &str) {
    let client = redis::Client::open(url).expect("valid redis url");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("connect for setup");
    let _: () = redis::cmd("SET")
        .arg(key)
        .arg(value)
        .query_async(&mut conn)
        .await
        .expect("set raw key");
}

/// Reads `key` with a plain `GET`, bypassing the store.
pub async fn get_raw(url: &str, key: &str) -> Option<String> {
    let client = redis::Client::open(url).expect("valid redis url");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("connect for inspection");
    redis::cmd("GET")
        .arg(key)
        .query_async(&mut conn)
        .await
        .expect("get raw key")
}

/// Removes every key a live test wrote.
pub async fn purge(url: &str, store: &RedisRankingStore) {
    let client = redis::Client::open(url).expect("valid redis url");
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("connect for cleanup");
    let pattern = format!("{}:*", store.keys().namespace());
    let keys: Vec<String> = redis::cmd("KEYS")
        .arg(&pattern)
        .query_async(&mut conn)
        .await
        .expect("list test keys");
    if !keys.is_empty() {
        let _: () = redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .expect("delete test keys");
    }
}
