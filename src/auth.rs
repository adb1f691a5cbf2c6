//! Authentication session.
//!
//! [`AuthSession`] is constructed once at startup and passed by reference
//! to whatever needs it (route guards, API clients). It is not a global.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──restore()──► Restoring ──┬──► Authenticated   (token stored)
//!                                          └──► Anonymous       (no token)
//!
//! Anonymous ──login()──► Authenticated ──logout()──► Anonymous
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::Result;
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY, load_json, save_json};

// ============================================================================
// Types
// ============================================================================

/// Phase of an [`AuthSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Created, nothing read yet.
    #[default]
    Uninitialized,
    /// Reading persisted credentials.
    Restoring,
    /// A token is held.
    Authenticated,
    /// No token.
    Anonymous,
}

/// The signed-in user as known locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Local identifier (`"self"` for users derived at login).
    pub id: String,
    /// E-mail used to sign in.
    pub email: String,
    /// Display name.
    pub name: String,
}

impl SessionUser {
    /// Derives a user from the login e-mail; the name is the local part.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or(email).to_string();
        Self {
            id: "self".to_string(),
            email: email.to_string(),
            name,
        }
    }
}

// ============================================================================
// AuthSession
// ============================================================================

/// Token and user of the current device.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    state: AuthState,
    token: Option<String>,
    user: Option<SessionUser>,
}

impl AuthSession {
    /// Creates an uninitialized session.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lifecycle phase.
    #[inline]
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Returns `true` iff a token is held.
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Returns `true` until [`restore`](Self::restore) has finished.
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, AuthState::Uninitialized | AuthState::Restoring)
    }

    /// Returns the access token.
    #[inline]
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the signed-in user.
    #[inline]
    #[must_use]
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Returns `api` with this session's token attached, if any.
    #[must_use]
    pub fn authorize(&self, api: &ApiClient) -> ApiClient {
        match &self.token {
            Some(token) => api.with_token(token.as_str()),
            None => api.clone(),
        }
    }

    /// Loads persisted credentials.
    ///
    /// Read failures are logged and leave the session anonymous; restoring
    /// never fails.
    pub async fn restore(&mut self, store: &dyn KeyValueStore) {
        self.state = AuthState::Restoring;

        match Self::read_persisted(store).await {
            Ok((token, user)) => {
                self.token = token;
                self.user = user;
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore auth state");
                self.token = None;
                self.user = None;
            }
        }

        self.state = self.settled_state();
        debug!(state = ?self.state, "Auth state restored");
    }

    /// Signs in and persists the token and derived user.
    ///
    /// On failure the session is unchanged and no token is left in the store.
    ///
    /// # Errors
    ///
    /// - [`Error::Api`](crate::Error::Api) if the backend rejects the credentials
    /// - [`Error::MissingToken`](crate::Error::MissingToken) if no token is returned
    /// - the store's error if persisting fails
    pub async fn login(
        &mut self,
        api: &ApiClient,
        store: &dyn KeyValueStore,
        email: &str,
        password: &str,
    ) -> Result<()> {
        let response = api.login(email, password).await?;
        let user = SessionUser::from_email(email);

        Self::persist(store, &response.access_token, &user).await?;

        info!(email, "Signed in");
        self.token = Some(response.access_token);
        self.user = Some(user);
        self.state = AuthState::Authenticated;
        Ok(())
    }

    /// Forgets the token and user, locally and in the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory session is cleared anyway.
    pub async fn logout(&mut self, store: &dyn KeyValueStore) -> Result<()> {
        self.token = None;
        self.user = None;
        self.state = AuthState::Anonymous;

        store.remove(USER_KEY).await?;
        store.remove(TOKEN_KEY).await?;

        info!("Signed out");
        Ok(())
    }

    /// Writes token and user; on a failed user write the token is removed
    /// again so the store never holds one without the other.
    async fn persist(store: &dyn KeyValueStore, token: &str, user: &SessionUser) -> Result<()> {
        store.set(TOKEN_KEY, token).await?;

        if let Err(e) = save_json(store, USER_KEY, user).await {
            warn!(error = %e, "Failed to persist user, discarding token");
            if let Err(cleanup) = store.remove(TOKEN_KEY).await {
                warn!(error = %cleanup, "Failed to discard token");
            }
            return Err(e);
        }

        Ok(())
    }

    async fn read_persisted(
        store: &dyn KeyValueStore,
    ) -> Result<(Option<String>, Option<SessionUser>)> {
        let token = store.get(TOKEN_KEY).await?.filter(|t| !t.is_empty());
        let user = load_json(store, USER_KEY).await?;
        Ok((token, user))
    }

    fn settled_state(&self) -> AuthState {
        if self.token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
