//! AKASYS client - chat connection manager and backend collaborators.
//!
//! This library provides the client side of the AKASYS backend: a
//! self-healing chatbot WebSocket connection plus the REST, auth and local
//! persistence pieces the app screens sit on.
//!
//! # Architecture
//!
//! - **Manager (sans-IO)**: [`ConnectionManager`] is a state machine driven
//!   by method calls; it owns a [`TransportFactory`] and a [`Clock`]
//! - **Event loop**: [`ChatClient`] runs the manager on one tokio task and
//!   funnels API calls, socket events and timer expiries through one queue
//! - **UI side**: [`ChatSession`] turns [`ManagerEvent`]s into a transcript;
//!   the manager never writes UI state
//!
//! Key design principles:
//!
//! - At most one live channel and one armed retry timer per manager
//! - Every connection attempt gets an [`Epoch`]; stale callbacks are dropped
//! - Transport and decode failures become state events, never errors
//! - `send()` while not connected is reported to the caller
//!
//! # Quick Start
//!
//! ```no_run
//! use akasys_client::{ChatClient, ChatSession, ClientConfig, ManagerEvent, OutboundMessage, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder().base_url("http://localhost:8000").build()?;
//!     let (client, mut events) = ChatClient::spawn(&config)?;
//!     let mut session = ChatSession::new();
//!
//!     client.connect()?;
//!
//!     while let Some(event) = events.recv().await {
//!         session.apply(&event);
//!         if let ManagerEvent::StateChanged(state) = event
//!             && state.is_connected()
//!             && session.transcript().is_empty()
//!         {
//!             let message = OutboundMessage::new("Oi")?;
//!             client.send(message.clone()).await?;
//!             session.record_sent(&message);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | REST client: login, user CRUD, upload |
//! | [`auth`] | [`AuthSession`] value object |
//! | [`chat`] | Transcript and chat screen session |
//! | [`client`] | [`ChatClient`] event loop |
//! | [`config`] | [`ClientConfig`] and [`RetryPolicy`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`manager`] | [`ConnectionManager`] state machine |
//! | [`mirror`] | [`LocalMirror`] user-list cache |
//! | [`protocol`] | Chat envelopes |
//! | [`storage`] | Key-value persistence |
//! | [`transport`] | Channel traits and WebSocket transport |

// ============================================================================
// Modules
// ============================================================================

/// REST client for the backend.
pub mod api;

/// Authentication session.
pub mod auth;

/// Chat transcript and screen session.
pub mod chat;

/// Async chat client.
///
/// Runs a [`ConnectionManager`] against the real WebSocket transport.
pub mod client;

/// Client configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Connection manager state machine.
pub mod manager;

/// Local mirror of the admin user list.
pub mod mirror;

/// Chat wire protocol.
pub mod protocol;

/// Key-value persistence.
pub mod storage;

/// Transport abstraction and WebSocket implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// API types
pub use api::{ApiClient, LoginResponse, NewUser, User, UserUpdate};

// Auth types
pub use auth::{AuthSession, AuthState, SessionUser};

// Chat types
pub use chat::{ChatEntry, ChatSession, ChatTranscript, Origin};

// Client types
pub use client::{ChatClient, EventStream};

// Config types
pub use config::{ClientConfig, ClientConfigBuilder, RetryPolicy};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{EntryId, Epoch, SubscriptionId, TimerId};

// Manager types
pub use manager::{Clock, ConnectionManager, ConnectionState, ManagerEvent, TokioClock};

// Mirror types
pub use mirror::LocalMirror;

// Protocol types
pub use protocol::{InboundMessage, OutboundMessage};

// Storage types
pub use storage::{FileStore, KeyValueStore, MemoryStore};

// Transport types
pub use transport::{Channel, TransportEvent, TransportFactory, WebSocketFactory};
