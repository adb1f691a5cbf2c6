//! Builder pattern for client configuration.
//!
//! # Base URL Resolution
//!
//! The first available source wins:
//!
//! 1. Value passed to [`ClientConfigBuilder::base_url`]
//! 2. `AKASYS_API_BASE_URL` environment variable at runtime
//! 3. `AKASYS_API_BASE_URL` environment variable at build time
//! 4. Platform fallback ([`default_base_url`])
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use akasys_client::{ClientConfig, RetryPolicy};
//!
//! # fn example() -> akasys_client::Result<()> {
//! let config = ClientConfig::builder()
//!     .base_url("http://localhost:8000")
//!     .retry(RetryPolicy::fixed(Duration::from_secs(1)))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::{CHAT_PATH, ClientConfig, DEFAULT_CONNECT_TIMEOUT, RetryPolicy};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "AKASYS_API_BASE_URL";

/// Base URL baked in at build time, if any.
const BUILD_TIME_BASE_URL: Option<&str> = option_env!("AKASYS_API_BASE_URL");

/// Fallback for Android devices reaching a development host on the LAN.
const ANDROID_FALLBACK: &str = "http://192.168.1.8:8000";

/// Fallback for every other platform.
const LOCAL_FALLBACK: &str = "http://localhost:8000";

// ============================================================================
// ClientConfigBuilder
// ============================================================================

/// Builder for configuring a [`ClientConfig`].
///
/// Use [`ClientConfig::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct ClientConfigBuilder {
    /// Explicit base URL.
    base_url: Option<String>,
    /// Chat endpoint path override.
    chat_path: Option<String>,
    /// Reconnect policy override.
    retry: Option<RetryPolicy>,
    /// Handshake timeout override.
    connect_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend base URL (`http://host:port`).
    #[inline]
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the chat endpoint path.
    #[inline]
    #[must_use]
    pub fn chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = Some(path.into());
        self
    }

    /// Sets the reconnect policy.
    #[inline]
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the WebSocket handshake timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Builds the configuration with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the base URL does not parse
    /// - [`Error::Config`] if the base URL is not `http`/`https` or carries
    ///   a query or fragment
    pub fn build(self) -> Result<ClientConfig> {
        let raw = resolve_base_url(self.base_url, env::var(BASE_URL_ENV).ok());
        let base_url = validate_base_url(&raw)?;

        debug!(%base_url, "Client configuration resolved");

        Ok(ClientConfig {
            base_url,
            chat_path: self.chat_path.unwrap_or_else(|| CHAT_PATH.to_string()),
            retry: self.retry.unwrap_or_default(),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
        })
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Returns the platform fallback base URL.
#[inline]
#[must_use]
pub fn default_base_url() -> &'static str {
    if cfg!(target_os = "android") {
        ANDROID_FALLBACK
    } else {
        LOCAL_FALLBACK
    }
}

/// Picks the first non-empty base URL source.
fn resolve_base_url(explicit: Option<String>, runtime_env: Option<String>) -> String {
    explicit
        .into_iter()
        .chain(runtime_env)
        .chain(BUILD_TIME_BASE_URL.map(str::to_string))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| default_base_url().to_string())
}

/// Parses the base URL and returns its normalized form.
///
/// The result has a lowercase scheme and host, no query or fragment and
/// no trailing slash.
fn validate_base_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw)?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Base URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(Error::config(format!(
            "Base URL must not carry a query or fragment: {raw}"
        )));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

// ============================================================================
// Tests
// ============================================================================
