//! Chat screen state.
//!
//! The manager never mutates UI state. The screen owns a [`ChatSession`]
//! and feeds it the [`ManagerEvent`](crate::manager::ManagerEvent)s it
//! receives.

// ============================================================================
// Submodules
// ============================================================================

/// Per-screen session: transcript, typing indicator, input gating.
pub mod session;

/// Append-only transcript.
pub mod transcript;

// ============================================================================
// Re-exports
// ============================================================================

pub use session::ChatSession;
pub use transcript::{ChatEntry, ChatTranscript, Origin};
