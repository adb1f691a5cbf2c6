//! Chatbot wire protocol.
//!
//! Frames are UTF-8 JSON text carried over the chat WebSocket.
//!
//! | Message Type | Direction | Format |
//! |--------------|-----------|--------|
//! | [`OutboundMessage`] | Client → Server | `{"pergunta_original": "..."}` |
//! | [`InboundMessage`] | Server → Client | `{"pergunta_original": "...", "match_intencao"?: "...", "answer": "..."}` |
//!
//! There is no request ID. Replies are matched to questions by arrival
//! order only.

// ============================================================================
// Submodules
// ============================================================================

/// Outbound and inbound envelopes.
pub mod envelope;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{InboundMessage, MAX_MESSAGE_CHARS, OutboundMessage};
