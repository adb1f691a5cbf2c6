//! The connection manager state machine.
//!
//! [`ConnectionManager`] is sans-IO: it owns a [`TransportFactory`] and a
//! [`Clock`], and is driven entirely by method calls from a single event
//! loop (public API calls, transport events, timer expiries). It performs
//! no blocking work and holds no locks.
//!
//! # Invariants
//!
//! - At most one channel is live at any instant.
//! - At most one retry timer is armed at any instant.
//! - Transport events are acted on only if tagged with the active epoch.
//! - After an explicit `close()` no retry is ever scheduled until the next
//!   `connect()`.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, trace, warn};
use url::Url;

use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use crate::identifiers::{Epoch, SubscriptionId, TimerId};
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::transport::{Channel, TransportEvent, TransportFactory};

use super::clock::Clock;
use super::state::ConnectionState;

// ============================================================================
// Types
// ============================================================================

/// Event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    /// The manager entered a new state.
    StateChanged(ConnectionState),
    /// A well-formed reply arrived.
    Message(InboundMessage),
}

/// Subscriber callback.
///
/// Called synchronously from inside the manager; must not block.
pub type EventHandler = Box<dyn FnMut(&ManagerEvent) + Send>;

// ============================================================================
// ConnectionManager
// ============================================================================

/// Owns one logical connection to the chat endpoint.
///
/// # Example
///
/// ```ignore
/// let mut manager = ConnectionManager::new(factory, clock, RetryPolicy::default());
/// manager.subscribe(|event| println!("{event:?}"));
/// manager.connect(url);
///
/// // From the event loop:
/// manager.handle_transport_event(epoch, TransportEvent::Opened);
/// manager.send(&OutboundMessage::new("Oi")?)?;
/// ```
pub struct ConnectionManager<F: TransportFactory, C: Clock> {
    factory: F,
    clock: C,
    retry: RetryPolicy,

    state: ConnectionState,
    /// Target of the current and future attempts.
    url: Option<Url>,
    /// Last epoch issued.
    epoch: Epoch,
    /// Epoch whose events are accepted, `None` once the channel is released.
    active: Option<Epoch>,
    channel: Option<F::Channel>,

    pending_retry: Option<TimerId>,
    last_timer: TimerId,
    /// Consecutive failed attempts since the last successful open.
    attempt: u32,
    explicitly_closed: bool,

    handlers: Vec<(SubscriptionId, EventHandler)>,
    last_subscription: SubscriptionId,
}

// ============================================================================
// ConnectionManager - Constructor & Accessors
// ============================================================================

impl<F: TransportFactory, C: Clock> ConnectionManager<F, C> {
    /// Creates a disconnected manager.
    #[must_use]
    pub fn new(factory: F, clock: C, retry: RetryPolicy) -> Self {
        Self {
            factory,
            clock,
            retry,
            state: ConnectionState::Disconnected,
            url: None,
            epoch: Epoch::default(),
            active: None,
            channel: None,
            pending_retry: None,
            last_timer: TimerId::default(),
            attempt: 0,
            explicitly_closed: false,
            handlers: Vec::new(),
            last_subscription: SubscriptionId::default(),
        }
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the epoch of the most recent attempt.
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Returns the endpoint, once `connect()` has been called.
    #[inline]
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Returns `true` if a retry timer is armed.
    #[inline]
    #[must_use]
    pub fn has_pending_retry(&self) -> bool {
        self.pending_retry.is_some()
    }

    /// Returns `true` after an explicit `close()` until the next `connect()`.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.explicitly_closed
    }

    /// Returns the number of consecutive failed attempts.
    #[inline]
    #[must_use]
    pub fn failed_attempts(&self) -> u32 {
        self.attempt
    }
}

// ============================================================================
// ConnectionManager - Subscriptions
// ============================================================================

impl<F: TransportFactory, C: Clock> ConnectionManager<F, C> {
    /// Registers an event handler.
    ///
    /// Handlers run in subscription order.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&ManagerEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.last_subscription = self.last_subscription.next();
        let id = self.last_subscription;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes an event handler. Returns `false` if `id` was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    fn emit(&mut self, event: ManagerEvent) {
        for (_, handler) in &mut self.handlers {
            handler(&event);
        }
    }

    fn set_state(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }

        debug!(from = %self.state, to = %next, epoch = %self.epoch, "State transition");
        self.state = next;
        self.emit(ManagerEvent::StateChanged(next));
    }
}

// ============================================================================
// ConnectionManager - Public API
// ============================================================================

impl<F: TransportFactory, C: Clock> ConnectionManager<F, C> {
    /// Starts connecting to `url`.
    ///
    /// No-op while `Connecting` or `Connected`. While `Disconnecting`, the
    /// closing channel is abandoned and a fresh attempt starts. Cancels any
    /// armed retry timer and clears the explicit-close flag.
    pub fn connect(&mut self, url: Url) {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                debug!(state = %self.state, "connect() ignored, already active");
                return;
            }
            ConnectionState::Disconnecting => {
                debug!(epoch = %self.epoch, "connect() supersedes closing channel");
                self.release_channel();
            }
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {}
        }

        self.explicitly_closed = false;
        self.attempt = 0;
        self.cancel_retry();
        self.url = Some(url);
        self.open_channel();
    }

    /// Sends a message over the open channel.
    ///
    /// Never queues. Transport failures after the frame is handed to the
    /// channel surface as events, not here.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the state is not `Connected`
    /// - [`Error::Json`] if the message cannot be serialized
    pub fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        if !self.state.is_connected() {
            return Err(Error::not_connected(self.state));
        }

        let Some(channel) = self.channel.as_mut() else {
            return Err(Error::not_connected(self.state));
        };

        let frame = message.encode()?;
        trace!(epoch = %self.epoch, len = frame.len(), "Sending frame");
        channel.send_text(frame);

        Ok(())
    }

    /// Closes the connection and suppresses automatic reconnection.
    ///
    /// A pending retry is cancelled. Late events from a channel still
    /// handshaking have no effect other than its final close.
    pub fn close(&mut self) {
        self.explicitly_closed = true;
        self.cancel_retry();

        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.set_state(ConnectionState::Disconnecting);
                if let Some(channel) = self.channel.as_mut() {
                    channel.close();
                }
            }
            ConnectionState::Disconnecting => {
                trace!("close() ignored, already disconnecting");
            }
            ConnectionState::Disconnected | ConnectionState::Reconnecting => {
                self.release_channel();
                self.set_state(ConnectionState::Disconnected);
            }
        }
    }
}

// ============================================================================
// ConnectionManager - Event Handling
// ============================================================================

impl<F: TransportFactory, C: Clock> ConnectionManager<F, C> {
    /// Applies a transport event.
    ///
    /// Events from any epoch other than the active one are discarded.
    pub fn handle_transport_event(&mut self, epoch: Epoch, event: TransportEvent) {
        if self.active != Some(epoch) {
            trace!(%epoch, active = ?self.active, ?event, "Stale transport event ignored");
            return;
        }

        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Message(text) => self.on_message(&text),
            TransportEvent::Error(reason) => self.on_error(reason),
            TransportEvent::Closed { code, reason } => self.on_close(code, reason),
        }
    }

    /// Handles expiry of a retry timer.
    ///
    /// Only the currently armed timer has an effect.
    pub fn handle_timer(&mut self, timer: TimerId) {
        if self.pending_retry != Some(timer) {
            trace!(%timer, "Stale timer ignored");
            return;
        }
        self.pending_retry = None;

        if self.explicitly_closed || self.state != ConnectionState::Reconnecting {
            return;
        }

        info!(attempt = self.attempt, "Reconnecting");
        self.open_channel();
    }

    fn on_open(&mut self) {
        match self.state {
            ConnectionState::Connecting => {
                self.attempt = 0;
                info!(epoch = %self.epoch, "Chat connection open");
                self.set_state(ConnectionState::Connected);
            }
            state => debug!(%state, "Open event ignored"),
        }
    }

    fn on_message(&mut self, text: &str) {
        match InboundMessage::decode(text) {
            Ok(message) => self.emit(ManagerEvent::Message(message)),
            Err(e) => warn!(error = %e, frame = %text, "Dropped malformed frame"),
        }
    }

    fn on_error(&mut self, reason: String) {
        match self.state {
            ConnectionState::Connecting => self.on_lost(Error::transport_open(reason)),
            ConnectionState::Connected => self.on_lost(Error::unexpected_close(reason)),
            state => debug!(%state, %reason, "Transport error ignored"),
        }
    }

    fn on_close(&mut self, code: Option<u16>, reason: String) {
        match self.state {
            ConnectionState::Connecting => self.on_lost(Error::transport_open(reason)),
            ConnectionState::Connected => {
                let reason = match code {
                    Some(code) => format!("{code} {reason}"),
                    None => reason,
                };
                self.on_lost(Error::unexpected_close(reason));
            }
            ConnectionState::Disconnecting => {
                self.release_channel();
                info!(epoch = %self.epoch, "Chat connection closed");
                self.set_state(ConnectionState::Disconnected);
            }
            state => debug!(%state, "Close event ignored"),
        }
    }

    /// Unexpected loss: release the channel, go `Disconnected`, arm a retry.
    fn on_lost(&mut self, error: Error) {
        warn!(epoch = %self.epoch, error = %error, "Chat connection lost");
        self.release_channel();
        self.set_state(ConnectionState::Disconnected);
        self.schedule_retry();
    }
}

// ============================================================================
// ConnectionManager - Internals
// ============================================================================

impl<F: TransportFactory, C: Clock> ConnectionManager<F, C> {
    fn open_channel(&mut self) {
        let Some(url) = self.url.clone() else {
            return;
        };

        self.epoch = self.epoch.next();
        let epoch = self.epoch;
        self.set_state(ConnectionState::Connecting);

        match self.factory.open(&url, epoch) {
            Ok(channel) => {
                debug!(%url, %epoch, "Connection attempt started");
                self.channel = Some(channel);
                self.active = Some(epoch);
            }
            Err(e) => self.on_lost(Error::transport_open(e.to_string())),
        }
    }

    /// Drops the current channel, asking it to close first.
    fn release_channel(&mut self) {
        self.active = None;
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }

    fn schedule_retry(&mut self) {
        if self.explicitly_closed || self.url.is_none() {
            return;
        }

        self.cancel_retry();
        self.attempt = self.attempt.saturating_add(1);

        let delay = self.retry.delay_for(self.attempt);
        self.last_timer = self.last_timer.next();
        let timer = self.last_timer;

        self.clock.schedule(timer, delay);
        self.pending_retry = Some(timer);

        debug!(
            %timer,
            attempt = self.attempt,
            delay_ms = delay.as_millis() as u64,
            "Retry scheduled"
        );
        self.set_state(ConnectionState::Reconnecting);
    }

    fn cancel_retry(&mut self) {
        if let Some(timer) = self.pending_retry.take() {
            self.clock.cancel(timer);
        }
    }
}

impl<F: TransportFactory, C: Clock> Drop for ConnectionManager<F, C> {
    fn drop(&mut self) {
        self.cancel_retry();
        self.release_channel();
    }
}
