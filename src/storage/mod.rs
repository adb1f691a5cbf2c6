//! Local key-value persistence.
//!
//! Values are JSON strings stored under fixed keys. There is no schema
//! versioning; unreadable values are treated as absent by callers.
//!
//! | Key | Contents |
//! |-----|----------|
//! | [`TOKEN_KEY`] | Raw access token |
//! | [`USER_KEY`] | JSON [`SessionUser`](crate::auth::SessionUser) |
//! | [`USERS_CACHE_KEY`] | JSON array of [`User`](crate::api::User) |

// ============================================================================
// Submodules
// ============================================================================

/// JSON file backend.
pub mod file;

/// In-memory backend.
pub mod memory;

// ============================================================================
// Re-exports
// ============================================================================

pub use file::FileStore;
pub use memory::MemoryStore;

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Key of the access token.
pub const TOKEN_KEY: &str = "token";

/// Key of the signed-in user.
pub const USER_KEY: &str = "user";

/// Key of the local user-list mirror.
pub const USERS_CACHE_KEY: &str = "usuarios_cache";

// ============================================================================
// KeyValueStore
// ============================================================================

/// String key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Missing keys are not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

// ============================================================================
// JSON Helpers
// ============================================================================

/// Reads and deserializes the value under `key`.
///
/// A value that fails to parse is logged and reported as absent.
///
/// # Errors
///
/// Returns the store's error if the read itself fails.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable stored value");
            Ok(None)
        }
    }
}

/// Serializes `value` and stores it under `key`.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) or the store's error.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

// ============================================================================
// Tests
// ============================================================================
