//! In-memory key-value store.

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::Result;

use super::KeyValueStore;

/// Process-local [`KeyValueStore`]. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("token", "abc").await.expect("set");
        assert_eq!(store.get("token").await.expect("get").as_deref(), Some("abc"));

        store.remove("token").await.expect("remove");
        assert!(store.get("token").await.expect("get").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nope").await.is_ok());
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            store.set("user", "a").await.expect("set");
            store.set("user", "b").await.expect("set");
            assert_eq!(store.get("user").await.expect("get").as_deref(), Some("b"));
        });
        assert_eq!(store.len(), 1);
    }
}
