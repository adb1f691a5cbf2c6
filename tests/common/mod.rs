//! Shared test utilities.
//!
//! Provides:
//! - A recording transport factory whose channels never touch the network
//! - A manual clock whose timers fire only when told to
//! - A [`Harness`] bundling both with a manager and an event log

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Once};
use std::time::Duration;

use akasys_client::transport::{Channel, TransportEvent, TransportFactory};
use akasys_client::{
    Clock, ConnectionManager, ConnectionState, Epoch, Error, InboundMessage, ManagerEvent,
    Result, RetryPolicy, TimerId,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use url::Url;

// ============================================================================
// Logging
// ============================================================================

static INIT: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Everything the mock transport observed.
#[derive(Debug, Default)]
pub struct TransportLog {
    /// `open()` calls in order.
    pub opened: Vec<(Url, Epoch)>,
    /// Frames written, with the epoch of the writing channel.
    pub writes: Vec<(Epoch, String)>,
    /// `close()` calls on channels.
    pub close_requests: Vec<Epoch>,
    /// Channels not yet dropped.
    pub live: usize,
    /// Make the next `open()` fail synchronously.
    pub fail_next_open: bool,
}

pub struct MockFactory {
    log: Arc<Mutex<TransportLog>>,
}

pub struct MockChannel {
    epoch: Epoch,
    log: Arc<Mutex<TransportLog>>,
}

impl TransportFactory for MockFactory {
    type Channel = MockChannel;

    fn open(&mut self, url: &Url, epoch: Epoch) -> Result<MockChannel> {
        let mut log = self.log.lock();
        if log.fail_next_open {
            log.fail_next_open = false;
            return Err(Error::connection("refused"));
        }
        log.opened.push((url.clone(), epoch));
        log.live += 1;
        Ok(MockChannel {
            epoch,
            log: Arc::clone(&self.log),
        })
    }
}

impl Channel for MockChannel {
    fn send_text(&mut self, text: String) {
        self.log.lock().writes.push((self.epoch, text));
    }

    fn close(&mut self) {
        self.log.lock().close_requests.push(self.epoch);
    }
}

impl Drop for MockChannel {
    fn drop(&mut self) {
        self.log.lock().live -= 1;
    }
}

// ============================================================================
// Manual Clock
// ============================================================================

#[derive(Debug, Default)]
pub struct ClockLog {
    /// Every `schedule()` call.
    pub scheduled: Vec<(TimerId, Duration)>,
    /// Timers armed and neither fired nor cancelled.
    pub pending: Vec<TimerId>,
    /// Every `cancel()` call.
    pub cancelled: Vec<TimerId>,
}

pub struct ManualClock {
    log: Arc<Mutex<ClockLog>>,
}

impl Clock for ManualClock {
    fn schedule(&mut self, timer: TimerId, delay: Duration) {
        let mut log = self.log.lock();
        log.scheduled.push((timer, delay));
        log.pending.push(timer);
    }

    fn cancel(&mut self, timer: TimerId) {
        let mut log = self.log.lock();
        log.cancelled.push(timer);
        log.pending.retain(|t| *t != timer);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub const RETRY_DELAY: Duration = Duration::from_millis(3000);

pub struct Harness {
    pub manager: ConnectionManager<MockFactory, ManualClock>,
    pub transport: Arc<Mutex<TransportLog>>,
    pub clock: Arc<Mutex<ClockLog>>,
    pub events: Arc<Mutex<Vec<ManagerEvent>>>,
}

impl Harness {
    pub fn new() -> Self {
        init_logging();

        let transport = Arc::new(Mutex::new(TransportLog::default()));
        let clock = Arc::new(Mutex::new(ClockLog::default()));
        let events = Arc::new(Mutex::new(Vec::new()));

        let mut manager = ConnectionManager::new(
            MockFactory {
                log: Arc::clone(&transport),
            },
            ManualClock {
                log: Arc::clone(&clock),
            },
            RetryPolicy::fixed(RETRY_DELAY),
        );

        let recorded = Arc::clone(&events);
        manager.subscribe(move |event| recorded.lock().push(event.clone()));

        Self {
            manager,
            transport,
            clock,
            events,
        }
    }

    pub fn url() -> Url {
        Url::parse("ws://localhost:8000/wb/chatbot").expect("url")
    }

    pub fn connect(&mut self) {
        self.manager.connect(Self::url());
    }

    /// Delivers `event` tagged with the manager's current epoch.
    pub fn deliver(&mut self, event: TransportEvent) {
        let epoch = self.manager.epoch();
        self.manager.handle_transport_event(epoch, event);
    }

    pub fn open(&mut self) {
        self.deliver(TransportEvent::Opened);
    }

    pub fn error(&mut self) {
        self.deliver(TransportEvent::Error("boom".into()));
    }

    pub fn closed(&mut self) {
        self.deliver(TransportEvent::closed(Some(1006), "abnormal"));
    }

    pub fn message(&mut self, text: &str) {
        self.deliver(TransportEvent::Message(text.to_string()));
    }

    /// Connects and completes the handshake.
    pub fn connected() -> Self {
        let mut harness = Self::new();
        harness.connect();
        harness.open();
        harness
    }

    /// Fires the single pending timer. Panics if none or several are armed.
    pub fn fire_retry(&mut self) {
        let timer = {
            let mut log = self.clock.lock();
            assert_eq!(log.pending.len(), 1, "expected exactly one pending timer");
            log.pending.remove(0)
        };
        self.manager.handle_timer(timer);
    }

    pub fn states(&self) -> Vec<ConnectionState> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ManagerEvent::StateChanged(state) => Some(*state),
                ManagerEvent::Message(_) => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<InboundMessage> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ManagerEvent::Message(message) => Some(message.clone()),
                ManagerEvent::StateChanged(_) => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    pub fn opens(&self) -> usize {
        self.transport.lock().opened.len()
    }

    pub fn live_channels(&self) -> usize {
        self.transport.lock().live
    }

    pub fn pending_timers(&self) -> usize {
        self.clock.lock().pending.len()
    }

    pub fn writes(&self) -> Vec<String> {
        self.transport
            .lock()
            .writes
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Asserts the concurrency invariant.
    pub fn assert_at_most_one(&self) {
        assert!(self.live_channels() <= 1, "live channels: {}", self.live_channels());
        assert!(self.pending_timers() <= 1, "pending timers: {}", self.pending_timers());
    }
}
