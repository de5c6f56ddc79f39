//! Shared key-value backend seam.
//!
//! Codes and sessions both live behind [`KeyValueStore`]. Production uses
//! [`super::redis_store::RedisStore`] so every instance sees the same state; tests and
//! local runs use [`MemoryStore`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::error::Result;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Missing and expired keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value, for `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically delete `key` if and only if it currently holds `expected`.
    ///
    /// Returns whether the key was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process store with per-key expiry.
///
/// Expiry follows the tokio clock, so a paused test runtime can advance time
/// past a TTL without sleeping.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let matches = entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now) && entry.value == expected);
        if matches {
            entries.remove(key);
        }
        Ok(matches)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
