//! # Key-Value Store
//!
//! Every piece of state lives behind [`KvStore`]: a string key to JSON value
//! map with prefix scans, plus two atomic primitives.
//!
//! - [`KvStore::increment`] replaces read-then-write counters, so concurrent
//!   views of the same project are never lost.
//! - [`KvStore::insert_indexed`] writes a record and appends its key to an
//!   ordered index in one step, so the index never names a record that was
//!   not written (and vice versa).
//!
//! Backends: [`crate::database::RedisStore`] in production, [`MemoryStore`]
//! for tests and single-process runs.
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Value under {key} is not an integer")]
    NotAnInteger { key: String },

    #[error("Counter under {key} would overflow")]
    Overflow { key: String },

    #[error("Value under {key} is not an index")]
    NotAnIndex { key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: String,
    pub value: Value,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Point lookup. An absent key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Upsert, overwriting the whole value.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// All entries whose key starts with `prefix`, in no particular order.
    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<KvEntry>, StoreError>;

    /// Adds `by` to the integer under `key` (absent counts as 0) and returns
    /// the new value.
    async fn increment(&self, key: &str, by: i64) -> Result<i64, StoreError>;

    /// Writes `value` under `key` and appends `key` to the index at
    /// `index_key`, both or neither.
    async fn insert_indexed(
        &self,
        key: &str,
        value: &Value,
        index_key: &str,
    ) -> Result<(), StoreError>;

    /// Keys of an index in append order. An absent index is empty.
    async fn index_members(&self, index_key: &str) -> Result<Vec<String>, StoreError>;
}

/// In-process store. Indexes are kept as JSON arrays of keys, matching how
/// they look when read back through [`KvStore::get`].
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());

        Ok(())
    }

    async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<KvEntry>, StoreError> {
        let entries = self.entries.read().await;

        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| KvEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    async fn increment(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let mut entries = self.entries.write().await;

        let current = match entries.get(key) {
            None => 0,
            Some(value) => value.as_i64().ok_or_else(|| StoreError::NotAnInteger {
                key: key.to_string(),
            })?,
        };

        let next = current
            .checked_add(by)
            .ok_or_else(|| StoreError::Overflow {
                key: key.to_string(),
            })?;
        entries.insert(key.to_string(), Value::from(next));

        Ok(next)
    }

    async fn insert_indexed(
        &self,
        key: &str,
        value: &Value,
        index_key: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        let mut members = match entries.get(index_key) {
            None => Vec::new(),
            Some(Value::Array(members)) => members.clone(),
            Some(_) => {
                return Err(StoreError::NotAnIndex {
                    key: index_key.to_string(),
                });
            }
        };
        members.push(Value::from(key));

        entries.insert(key.to_string(), value.clone());
        entries.insert(index_key.to_string(), Value::Array(members));

        Ok(())
    }

    async fn index_members(&self, index_key: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().await;

        match entries.get(index_key) {
            None => Ok(Vec::new()),
            Some(Value::Array(members)) => members
                .iter()
                .map(|member| {
                    member
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| StoreError::NotAnIndex {
                            key: index_key.to_string(),
                        })
                })
                .collect(),
            Some(_) => Err(StoreError::NotAnIndex {
                key: index_key.to_string(),
            }),
        }
    }
}
