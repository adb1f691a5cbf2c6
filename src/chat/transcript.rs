//! Append-only chat transcript.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identifiers::EntryId;

// ============================================================================
// Origin
// ============================================================================

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed by the local user.
    User,
    /// Reply from the chatbot.
    Bot,
}

// ============================================================================
// ChatEntry
// ============================================================================

/// One line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    /// Unique entry ID.
    pub id: EntryId,
    /// Displayed text.
    pub text: String,
    /// Who wrote it.
    pub origin: Origin,
    /// When it was appended.
    pub sent_at: DateTime<Utc>,
}

// ============================================================================
// ChatTranscript
// ============================================================================

/// Ordered conversation history.
///
/// Entries are never reordered or removed.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    entries: Vec<ChatEntry>,
}

impl ChatTranscript {
    /// Creates an empty transcript.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user entry.
    pub fn push_user(&mut self, text: impl Into<String>) -> EntryId {
        self.push(Origin::User, text.into())
    }

    /// Appends a bot entry.
    pub fn push_bot(&mut self, text: impl Into<String>) -> EntryId {
        self.push(Origin::Bot, text.into())
    }

    fn push(&mut self, origin: Origin, text: String) -> EntryId {
        let id = EntryId::generate();
        self.entries.push(ChatEntry {
            id,
            text,
            origin,
            sent_at: Utc::now(),
        });
        id
    }

    /// Returns all entries, oldest first.
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Returns the newest entry.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been said yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChatEntry> {
        self.entries.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
