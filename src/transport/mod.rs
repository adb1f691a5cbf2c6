//! Transport layer.
//!
//! The [`ConnectionManager`](crate::manager::ConnectionManager) never touches
//! a socket directly. It asks a [`TransportFactory`] for a [`Channel`] and
//! learns about the channel's lifecycle through [`TransportEvent`]s that the
//! host event loop feeds back into it, tagged with the [`Epoch`] the channel
//! was opened under.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  open(url, epoch)  ┌───────────────────────┐
//! │  ConnectionManager   │───────────────────►│  TransportFactory     │
//! │                      │                    │  → Channel            │
//! │  handle_transport_   │◄───────────────────│  (spawned I/O task)   │
//! │  event(epoch, event) │   EventSink        │                       │
//! └──────────────────────┘                    └───────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | tokio-tungstenite implementation |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket transport.
pub mod websocket;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::{WebSocketChannel, WebSocketFactory};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use url::Url;

use crate::error::Result;
use crate::identifiers::Epoch;

// ============================================================================
// Types
// ============================================================================

/// Callback receiving transport events.
///
/// Implementations forward into the host event queue. Must not block.
pub type EventSink = Arc<dyn Fn(Epoch, TransportEvent) + Send + Sync>;

// ============================================================================
// TransportEvent
// ============================================================================

/// Lifecycle event of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed, channel writable.
    Opened,
    /// Text frame received.
    Message(String),
    /// Transport-level failure.
    Error(String),
    /// Channel closed. Always the last event of a channel.
    Closed {
        /// Close code, if the peer sent one.
        code: Option<u16>,
        /// Close reason.
        reason: String,
    },
}

impl TransportEvent {
    /// Creates a close event.
    #[inline]
    #[must_use]
    pub fn closed(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Closed {
            code,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// A duplex text channel owned by the manager.
pub trait Channel: Send {
    /// Queues a text frame. Failures surface as [`TransportEvent::Error`].
    fn send_text(&mut self, text: String);

    /// Requests shutdown. A [`TransportEvent::Closed`] follows.
    fn close(&mut self);
}

/// Produces channels for the manager.
pub trait TransportFactory: Send {
    /// Channel type produced by this factory.
    type Channel: Channel;

    /// Starts opening a channel to `url`.
    ///
    /// Returns immediately. The outcome arrives later as
    /// [`TransportEvent::Opened`] or [`TransportEvent::Error`].
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot even be started.
    fn open(&mut self, url: &Url, epoch: Epoch) -> Result<Self::Channel>;
}

// ============================================================================
// Tests
// ============================================================================
