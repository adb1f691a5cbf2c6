//! Local mirror of the admin user list.
//!
//! The backend has no list-all endpoint, so the admin screen keeps its own
//! list of the users it has created, read, or updated. The mirror is a
//! cache with weak consistency: it reflects only operations observed on
//! this device and never a server-confirmed full set.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::debug;

use crate::api::User;
use crate::error::Result;
use crate::storage::{KeyValueStore, USERS_CACHE_KEY, load_json, save_json};

// ============================================================================
// LocalMirror
// ============================================================================

/// Locally observed users, newest first.
pub struct LocalMirror {
    store: Arc<dyn KeyValueStore>,
    users: Vec<User>,
}

impl LocalMirror {
    /// Creates an empty mirror persisting into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            users: Vec::new(),
        }
    }

    /// Creates a mirror and loads the persisted list.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let users: Vec<User> = load_json(store.as_ref(), USERS_CACHE_KEY)
            .await?
            .unwrap_or_default();

        debug!(count = users.len(), "User mirror restored");
        Ok(Self { store, users })
    }

    /// Returns all mirrored users.
    #[inline]
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Returns the number of mirrored users.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if nothing has been observed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Returns the user with `id`.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive substring search over name and e-mail.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&User> {
        let query = query.to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                u.nome.to_lowercase().contains(&query) || u.email.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Records a created user at the front, replacing any stale copy.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory list is updated regardless.
    pub async fn record_created(&mut self, user: User) -> Result<()> {
        self.users.retain(|u| u.id != user.id);
        self.users.insert(0, user);
        self.persist().await
    }

    /// Records a fetched user: replaced in place, or added at the front.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory list is updated regardless.
    pub async fn record_read(&mut self, user: User) -> Result<()> {
        match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => self.users.insert(0, user),
        }
        self.persist().await
    }

    /// Records an updated user. Unknown IDs are not added.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory list is updated regardless.
    pub async fn record_updated(&mut self, user: User) -> Result<()> {
        if let Some(existing) = self.users.iter_mut().find(|u| u.id == user.id) {
            *existing = user;
        }
        self.persist().await
    }

    /// Records a deletion.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory list is updated regardless.
    pub async fn record_deleted(&mut self, id: i64) -> Result<()> {
        self.users.retain(|u| u.id != id);
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        save_json(self.store.as_ref(), USERS_CACHE_KEY, &self.users).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::MemoryStore;

    fn user(id: i64, nome: &str, email: &str) -> User {
        User {
            id,
            nome: nome.to_string(),
            email: email.to_string(),
            senha: None,
        }
    }

    fn ids(mirror: &LocalMirror) -> Vec<i64> {
        mirror.users().iter().map(|u| u.id).collect()
    }

    #[tokio::test]
    async fn test_created_goes_first_and_dedupes() {
        let mut mirror = LocalMirror::new(Arc::new(MemoryStore::new()));
        mirror.record_created(user(1, "Ana", "ana@x.com")).await.expect("record");
        mirror.record_created(user(2, "Bia", "bia@x.com")).await.expect("record");
        mirror.record_created(user(1, "Ana Costa", "ana@x.com")).await.expect("record");

        assert_eq!(ids(&mirror), [1, 2]);
        assert_eq!(mirror.get(1).map(|u| u.nome.as_str()), Some("Ana Costa"));
    }

    #[tokio::test]
    async fn test_read_replaces_in_place() {
        let mut mirror = LocalMirror::new(Arc::new(MemoryStore::new()));
        mirror.record_created(user(1, "Ana", "ana@x.com")).await.expect("record");
        mirror.record_created(user(2, "Bia", "bia@x.com")).await.expect("record");

        mirror.record_read(user(1, "Ana C.", "ana@x.com")).await.expect("record");
        assert_eq!(ids(&mirror), [2, 1]);

        mirror.record_read(user(7, "Caio", "caio@x.com")).await.expect("record");
        assert_eq!(ids(&mirror), [7, 2, 1]);
    }

    #[tokio::test]
    async fn test_update_unknown_not_added() {
        let mut mirror = LocalMirror::new(Arc::new(MemoryStore::new()));
        mirror.record_updated(user(5, "X", "x@x.com")).await.expect("record");
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let mut mirror = LocalMirror::new(Arc::new(MemoryStore::new()));
        mirror.record_created(user(1, "Ana", "ana@x.com")).await.expect("record");
        mirror.record_deleted(1).await.expect("record");
        mirror.record_deleted(99).await.expect("record");
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_restore_roundtrip() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut mirror = LocalMirror::new(Arc::clone(&store));
        mirror.record_created(user(1, "Ana", "ana@x.com")).await.expect("record");

        let restored = LocalMirror::restore(store).await.expect("restore");
        assert_eq!(restored.users(), mirror.users());
    }

    #[tokio::test]
    async fn test_restore_ignores_non_array() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(USERS_CACHE_KEY, r#"{"id":1}"#).await.expect("set");

        let restored = LocalMirror::restore(store).await.expect("restore");
        assert!(restored.is_empty());
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let mut mirror = LocalMirror::new(Arc::new(MemoryStore::new()));
        mirror.record_created(user(1, "Ana Costa", "ana@x.com")).await.expect("record");
        mirror.record_created(user(2, "Pedro Lima", "PEDRO@akasys.com")).await.expect("record");

        let hits: Vec<_> = mirror.search("akasys").iter().map(|u| u.id).collect();
        assert_eq!(hits, [2]);
        assert_eq!(mirror.search("COSTA").len(), 1);
        assert_eq!(mirror.search("").len(), 2);
    }
}
