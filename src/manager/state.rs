//! Connection state.
//!
//! ```text
//!                connect()            onopen
//! Disconnected ───────────► Connecting ───────► Connected
//!   ▲    │                    │  │                │  │
//!   │    │ retry timer        │  │ error/close    │  │ close (unexpected)
//!   │    │                    │  ▼                │  ▼
//!   │  Reconnecting ◄──────── Disconnected ◄──────┘  (retry armed)
//!   │
//!   │  onclose          close()
//!   └──────── Disconnecting ◄──── Connecting / Connected
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

// ============================================================================
// ConnectionState
// ============================================================================

/// State of a [`ConnectionManager`](super::ConnectionManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No transport.
    #[default]
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Transport open; `send()` allowed.
    Connected,
    /// Explicit `close()` requested, waiting for the transport to close.
    Disconnecting,
    /// Connection lost; a retry timer is armed.
    Reconnecting,
}

impl ConnectionState {
    /// Returns `true` if messages may be sent.
    #[inline]
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if a transport exists or is being opened.
    #[inline]
    #[must_use]
    pub const fn has_transport(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Disconnecting)
    }

    /// Returns the lowercase state name.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
