//! Client configuration.
//!
//! The client needs a single backend base URL. Everything else (REST
//! endpoints, the chat WebSocket URL) is derived from it.
//!
//! # Example
//!
//! ```
//! use akasys_client::ClientConfig;
//!
//! # fn example() -> akasys_client::Result<()> {
//! let config = ClientConfig::builder()
//!     .base_url("https://api.example.com")
//!     .build()?;
//!
//! assert_eq!(config.api_url("usuario/1"), "https://api.example.com/usuario/1");
//! assert_eq!(config.ws_url()?.as_str(), "wss://api.example.com/wb/chatbot");
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | [`ClientConfigBuilder`] and base URL resolution |
//! | `retry` | [`RetryPolicy`] for the connection manager |

// ============================================================================
// Submodules
// ============================================================================

/// Builder and base URL resolution.
pub mod builder;

/// Reconnect policy.
pub mod retry;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{BASE_URL_ENV, ClientConfigBuilder, default_base_url};
pub use retry::RetryPolicy;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Path of the chatbot WebSocket endpoint.
pub const CHAT_PATH: &str = "/wb/chatbot";

/// Default timeout for the WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// ClientConfig
// ============================================================================

/// Resolved client configuration.
///
/// Use [`ClientConfig::builder()`] to create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash (`http://host:port`).
    pub(crate) base_url: String,
    /// Path of the chat endpoint.
    pub(crate) chat_path: String,
    /// Reconnect policy.
    pub(crate) retry: RetryPolicy,
    /// WebSocket handshake timeout.
    pub(crate) connect_timeout: Duration,
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the backend base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the reconnect policy.
    #[inline]
    #[must_use]
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Returns the WebSocket handshake timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the full URL for a REST endpoint.
    ///
    /// A missing leading `/` on `endpoint` is added.
    #[must_use]
    pub fn api_url(&self, endpoint: &str) -> String {
        join(&self.base_url, endpoint)
    }

    /// Returns the full URL for a WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL scheme is not `http`/`https`.
    pub fn ws_endpoint(&self, endpoint: &str) -> Result<Url> {
        let ws_base = to_ws_scheme(&self.base_url)?;
        Ok(Url::parse(&join(&ws_base, endpoint))?)
    }

    /// Returns the chatbot WebSocket URL (`ws(s)://host/wb/chatbot`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL scheme is not `http`/`https`.
    pub fn ws_url(&self) -> Result<Url> {
        self.ws_endpoint(&self.chat_path)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Joins a base URL and an endpoint with exactly one `/`.
fn join(base: &str, endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

/// Transposes `http(s)://` to `ws(s)://`.
fn to_ws_scheme(http_url: &str) -> Result<String> {
    if let Some(rest) = http_url.strip_prefix("https://") {
        Ok(format!("wss://{rest}"))
    } else if let Some(rest) = http_url.strip_prefix("http://") {
        Ok(format!("ws://{rest}"))
    } else {
        Err(Error::config(format!(
            "Base URL must use http or https: {http_url}"
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
