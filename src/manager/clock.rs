//! Retry timers.
//!
//! The manager arms and cancels timers through the [`Clock`] trait and is
//! told about expiry via
//! [`ConnectionManager::handle_timer`](super::ConnectionManager::handle_timer).

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::identifiers::TimerId;

// ============================================================================
// Types
// ============================================================================

/// Callback receiving timer expiries. Must not block.
pub type TimerSink = Arc<dyn Fn(TimerId) + Send + Sync>;

// ============================================================================
// Clock
// ============================================================================

/// Schedules cancellable one-shot timers.
pub trait Clock: Send {
    /// Arms `timer` to fire once after `delay`.
    fn schedule(&mut self, timer: TimerId, delay: Duration);

    /// Disarms `timer`. Unknown or already fired timers are ignored.
    fn cancel(&mut self, timer: TimerId);
}

// ============================================================================
// TokioClock
// ============================================================================

/// [`Clock`] backed by `tokio::time::sleep` tasks.
///
/// Requires a running tokio runtime. Pending timers are aborted on drop.
pub struct TokioClock {
    sink: TimerSink,
    tasks: FxHashMap<TimerId, JoinHandle<()>>,
}

impl TokioClock {
    /// Creates a clock reporting expiries into `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: TimerSink) -> Self {
        Self {
            sink,
            tasks: FxHashMap::default(),
        }
    }

    /// Returns the number of timers not yet fired or cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl Clock for TokioClock {
    fn schedule(&mut self, timer: TimerId, delay: Duration) {
        self.tasks.retain(|_, task| !task.is_finished());

        let sink = Arc::clone(&self.sink);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink(timer);
        });

        trace!(%timer, delay_ms = delay.as_millis() as u64, "Timer armed");
        if let Some(previous) = self.tasks.insert(timer, task) {
            previous.abort();
        }
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(task) = self.tasks.remove(&timer) {
            task.abort();
            trace!(%timer, "Timer cancelled");
        }
    }
}

impl Drop for TokioClock {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
