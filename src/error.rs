//! Error types for the AKASYS client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use akasys_client::{OutboundMessage, Result};
//!
//! async fn example(client: &ChatClient) -> Result<()> {
//!     let message = OutboundMessage::new("Oi")?;
//!     client.send(message).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::Url`] |
//! | Chat | [`Error::InvalidMessage`], [`Error::NotConnected`] |
//! | Connection | [`Error::TransportOpen`], [`Error::UnexpectedClose`], [`Error::Connection`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Decode`] |
//! | REST | [`Error::Api`], [`Error::MissingToken`], [`Error::Http`] |
//! | Storage | [`Error::Storage`] |
//! | External | [`Error::Io`], [`Error::Json`] |
//!
//! # Propagation
//!
//! [`Error::TransportOpen`], [`Error::UnexpectedClose`] and [`Error::Decode`]
//! never cross the [`ConnectionManager`](crate::manager::ConnectionManager)
//! boundary. The manager absorbs them into state events and logs them.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::manager::ConnectionState;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // ========================================================================
    // Chat Errors
    // ========================================================================
    /// Outbound message rejected before transmission.
    ///
    /// Returned when the text is empty or exceeds the length limit.
    #[error("Invalid message: {message}")]
    InvalidMessage {
        /// Description of the violation.
        message: String,
    },

    /// `send()` called while the manager is not connected.
    ///
    /// No frame was written to the transport.
    #[error("Not connected (state: {state})")]
    NotConnected {
        /// State of the manager at the time of the call.
        state: ConnectionState,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection attempt failed before reaching the open state.
    #[error("Transport open failed: {message}")]
    TransportOpen {
        /// Description of the failure.
        message: String,
    },

    /// Open connection closed without an explicit `close()` call.
    #[error("Connection closed unexpectedly: {reason}")]
    UnexpectedClose {
        /// Close reason reported by the transport.
        reason: String,
    },

    /// Generic connection failure.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Event loop is gone.
    ///
    /// Returned by [`ChatClient`](crate::client::ChatClient) after shutdown.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Inbound payload could not be decoded.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    // ========================================================================
    // REST Errors
    // ========================================================================
    /// Backend answered with a non-success status.
    #[error("API error {status}: {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body, raw body, or a generic message.
        detail: String,
    },

    /// Login succeeded but no `access_token` was returned.
    #[error("Token not returned by server")]
    MissingToken,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ========================================================================
    // Storage Errors
    // ========================================================================
    /// Key-value store failure.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid message error.
    #[inline]
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }

    /// Creates a not connected error.
    #[inline]
    pub fn not_connected(state: ConnectionState) -> Self {
        Self::NotConnected { state }
    }

    /// Creates a transport open error.
    #[inline]
    pub fn transport_open(message: impl Into<String>) -> Self {
        Self::TransportOpen {
            message: message.into(),
        }
    }

    /// Creates an unexpected close error.
    #[inline]
    pub fn unexpected_close(reason: impl Into<String>) -> Self {
        Self::UnexpectedClose {
            reason: reason.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates an API error.
    #[inline]
    pub fn api(status: u16, detail: impl Into<String>) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    /// Creates a storage error.
    #[inline]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::TransportOpen { .. }
                | Self::UnexpectedClose { .. }
                | Self::Connection { .. }
                | Self::ConnectionClosed
        )
    }

    /// Returns `true` if this is a `send()` precondition failure.
    #[inline]
    #[must_use]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected { .. })
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TransportOpen { .. }
                | Self::UnexpectedClose { .. }
                | Self::NotConnected { .. }
                | Self::Http(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
