//! Chat envelopes.
//!
//! # Outbound
//!
//! ```json
//! { "pergunta_original": "Oi" }
//! ```
//!
//! # Inbound
//!
//! ```json
//! {
//!   "pergunta_original": "Oi",
//!   "match_intencao": "saudacao",
//!   "answer": "Olá! Como posso ajudar?"
//! }
//! ```
//!
//! `answer` is mandatory. A frame that is not JSON, or lacks a string
//! `answer`, fails [`InboundMessage::decode`].

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{from_str, to_string};

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length of an outbound message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 500;

// ============================================================================
// OutboundMessage
// ============================================================================

/// A user message waiting to be sent.
///
/// Construction validates the length, so every value is transmittable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    text: String,
}

/// Wire form of [`OutboundMessage`].
#[derive(Serialize)]
struct OutboundEnvelope<'a> {
    pergunta_original: &'a str,
}

impl OutboundMessage {
    /// Creates a message from user text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if `text` is empty or longer than
    /// [`MAX_MESSAGE_CHARS`] characters.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let chars = text.chars().count();

        if chars == 0 {
            return Err(Error::invalid_message("message is empty"));
        }

        if chars > MAX_MESSAGE_CHARS {
            return Err(Error::invalid_message(format!(
                "message has {chars} characters, maximum is {MAX_MESSAGE_CHARS}"
            )));
        }

        Ok(Self { text })
    }

    /// Returns the message text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Serializes the message into its JSON frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn encode(&self) -> Result<String> {
        let envelope = OutboundEnvelope {
            pergunta_original: &self.text,
        };
        Ok(to_string(&envelope)?)
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// A decoded server reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Echo of the question the server answered.
    #[serde(default)]
    pub pergunta_original: String,

    /// Intent matched by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_intencao: Option<String>,

    /// Reply text shown to the user.
    pub answer: String,
}

impl InboundMessage {
    /// Decodes a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the frame is not JSON or has no string
    /// `answer` field.
    pub fn decode(text: &str) -> Result<Self> {
        from_str(text).map_err(|e| Error::decode(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
