//! Chat screen session.
//!
//! Tracks what the chat screen shows: the transcript, a "typing" indicator
//! and whether the input box is enabled.
//!
//! Replies are matched to questions by arrival order only. The indicator
//! is raised on every successful send and lowered by the next decoded
//! reply, whatever its content. With two sends in flight the first reply
//! lowers it early; this is a known limitation of a protocol without
//! request IDs.

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use crate::error::Result;
use crate::identifiers::EntryId;
use crate::manager::{ConnectionState, ManagerEvent};
use crate::protocol::OutboundMessage;

use super::transcript::ChatTranscript;

// ============================================================================
// ChatSession
// ============================================================================

/// State of one mounted chat screen.
///
/// Created empty on mount and discarded on unmount.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: ChatTranscript,
    pending: bool,
    state: ConnectionState,
}

impl ChatSession {
    /// Creates an empty session.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transcript.
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    /// Returns `true` while waiting for a reply.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns the last connection state seen.
    #[inline]
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    /// Returns `true` if the input box should accept text.
    #[inline]
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.state.is_connected()
    }

    /// Validates `text`, hands it to `send`, and records it on success.
    ///
    /// Nothing is appended if validation or `send` fails.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMessage`](crate::Error::InvalidMessage) for empty or oversized text
    /// - whatever `send` returns, typically [`Error::NotConnected`](crate::Error::NotConnected)
    pub fn submit<S>(&mut self, text: &str, send: S) -> Result<EntryId>
    where
        S: FnOnce(&OutboundMessage) -> Result<()>,
    {
        let message = OutboundMessage::new(text.trim())?;
        send(&message)?;
        Ok(self.record_sent(&message))
    }

    /// Records a message that was already sent.
    ///
    /// For callers that send through the async [`ChatClient`](crate::ChatClient).
    pub fn record_sent(&mut self, message: &OutboundMessage) -> EntryId {
        self.pending = true;
        self.transcript.push_user(message.text())
    }

    /// Applies a manager event. Returns the ID of a new bot entry, if any.
    pub fn apply(&mut self, event: &ManagerEvent) -> Option<EntryId> {
        match event {
            ManagerEvent::StateChanged(state) => {
                trace!(%state, "Chat session state updated");
                self.state = *state;
                None
            }
            ManagerEvent::Message(reply) => {
                self.pending = false;
                Some(self.transcript.push_bot(reply.answer.as_str()))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
