//! In-memory key-value adapter.
//!
//! Used for tests and ephemeral sessions. Supports fault injection and an
//! artificial write latency so callers can exercise failure and suspension
//! paths without a real backend.

use crate::storage::{KeyValueStore, KvError, KvResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Process-local key-value store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    read_delay_ms: AtomicUsize,
    write_delay_ms: AtomicUsize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set`/`remove` fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Suspends each read for `delay` before serving it.
    pub fn set_read_delay(&self, delay: Duration) {
        self.inner.read_delay_ms.store(as_millis(delay), Ordering::SeqCst);
    }

    /// Suspends each write for `delay` before applying it.
    pub fn set_write_delay(&self, delay: Duration) {
        self.inner.write_delay_ms.store(as_millis(delay), Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Returns the raw bytes under `key` without fault injection.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.entries.read().await.get(key).cloned()
    }

    /// Stores raw bytes without fault injection or write accounting.
    pub async fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.inner
            .entries
            .write()
            .await
            .insert(key.to_string(), value.into());
    }

    async fn before_write(&self, key: &str) -> KvResult<()> {
        suspend(&self.inner.write_delay_ms).await;
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable(format!("injected write failure for `{key}`")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        suspend(&self.inner.read_delay_ms).await;
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable(format!("injected read failure for `{key}`")));
        }
        Ok(self.inner.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> KvResult<()> {
        self.before_write(key).await?;
        self.inner
            .entries
            .write()
            .await
            .insert(key.to_string(), value);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        self.before_write(key).await?;
        self.inner.entries.write().await.remove(key);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn as_millis(delay: Duration) -> usize {
    usize::try_from(delay.as_millis()).unwrap_or(usize::MAX)
}

async fn suspend(delay_ms: &AtomicUsize) {
    let millis = delay_ms.load(Ordering::SeqCst);
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis as u64)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::{KeyValueStore, KvError};

    #[tokio::test]
    async fn set_get_remove_roundtrip() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("goals").await.unwrap(), None);

        store.set("goals", b"[]".to_vec()).await.unwrap();
        assert_eq!(store.get("goals").await.unwrap(), Some(b"[]".to_vec()));

        store.remove("goals").await.unwrap();
        assert_eq!(store.get("goals").await.unwrap(), None);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn injected_write_failure_keeps_previous_value() {
        let store = MemoryKeyValueStore::new();
        store.set("subjects", b"old".to_vec()).await.unwrap();
        store.set_fail_writes(true);

        let err = store.set("subjects", b"new".to_vec()).await.unwrap_err();
        assert!(matches!(err, KvError::Unavailable(_)));
        assert_eq!(store.raw("subjects").await, Some(b"old".to_vec()));
    }
}
