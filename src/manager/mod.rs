//! Chat connection manager.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `state` | [`ConnectionState`] |
//! | `clock` | [`Clock`] trait and [`TokioClock`] |
//! | `core` | [`ConnectionManager`] state machine |

// ============================================================================
// Submodules
// ============================================================================

/// Retry timers.
pub mod clock;

/// Connection manager state machine.
pub mod core;

/// Connection state enum.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::clock::{Clock, TimerSink, TokioClock};
pub use self::core::{ConnectionManager, EventHandler, ManagerEvent};
pub use self::state::ConnectionState;
