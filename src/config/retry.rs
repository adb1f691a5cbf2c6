//! Reconnect policy.
//!
//! The manager waits a fixed delay after every non-explicit transition into
//! `Disconnected` and then tries again. There is no attempt cap and no
//! jitter.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default delay between reconnect attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3000);

// ============================================================================
// RetryPolicy
// ============================================================================

/// Policy deciding when the next connection attempt happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry forever after a constant delay.
    Fixed {
        /// Delay before each attempt.
        delay: Duration,
    },
}

impl RetryPolicy {
    /// Creates a fixed-delay policy.
    #[inline]
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    /// Returns the delay before retry number `attempt` (1-based).
    #[inline]
    #[must_use]
    pub const fn delay_for(&self, _attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => *delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_DELAY)
    }
}

// ============================================================================
// Tests
// ============================================================================
