//! # Redis
//!
//! Production backend for [`KvStore`].
//!
//! ## Layout
//!
//! - Records and counters: plain string keys holding JSON text
//! - Counters are JSON integers, so `INCRBY` works on them directly
//! - Indexes: Redis lists, appended with `RPUSH` inside the same `MULTI/EXEC`
//!   as the record they point at
//! - Prefix scans: cursor `SCAN` with an escaped `MATCH` pattern, never `KEYS`
//!
//! ## Connection
//!
//! A single [`ConnectionManager`] is shared by all requests. It reconnects on
//! its own; one retry and a short connect timeout keep a dead Redis from
//! stalling requests.
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use serde_json::Value;
use tracing::debug;

use crate::{
    store::{KvEntry, KvStore, StoreError},
    utils::glob_escape,
};

const SCAN_BATCH: usize = 200;

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            connection: init_redis(redis_url).await?,
        })
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut connection)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();

        Ok(keys)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: Option<String> = connection.get(key).await?;

        raw.map(|text| serde_json::from_str(&text))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let () = connection.set(key, serde_json::to_string(value)?).await?;

        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<KvEntry>, StoreError> {
        let keys = self.scan_keys(&format!("{}*", glob_escape(prefix))).await?;

        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut connection = self.connection.clone();
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut connection)
            .await?;

        let mut entries = Vec::with_capacity(keys.len());
        for (key, raw) in keys.into_iter().zip(values) {
            // deleted between SCAN and MGET
            let Some(text) = raw else {
                debug!("{key} vanished during prefix scan");
                continue;
            };

            entries.push(KvEntry {
                key,
                value: serde_json::from_str(&text)?,
            });
        }

        Ok(entries)
    }

    async fn increment(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.incr(key, by).await?)
    }

    async fn insert_indexed(
        &self,
        key: &str,
        value: &Value,
        index_key: &str,
    ) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();

        let () = redis::pipe()
            .atomic()
            .set(key, serde_json::to_string(value)?)
            .ignore()
            .rpush(index_key, key)
            .ignore()
            .query_async(&mut connection)
            .await?;

        Ok(())
    }

    async fn index_members(&self, index_key: &str) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.lrange(index_key, 0, -1).await?)
    }
}
