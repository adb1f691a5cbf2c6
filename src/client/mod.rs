//! Async chat client.
//!
//! [`ChatClient`] runs a [`ConnectionManager`] on a single tokio task. API
//! calls, transport events and timer expiries all travel through one FIFO
//! queue, so the manager sees them strictly in arrival order and never
//! needs a lock.
//!
//! # Example
//!
//! ```no_run
//! use akasys_client::{ChatClient, ClientConfig, ManagerEvent, OutboundMessage};
//!
//! # async fn example() -> akasys_client::Result<()> {
//! let config = ClientConfig::builder().base_url("http://localhost:8000").build()?;
//! let (client, mut events) = ChatClient::spawn(&config)?;
//!
//! client.connect()?;
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ManagerEvent::StateChanged(state) if state.is_connected() => {
//!             client.send(OutboundMessage::new("Oi")?).await?;
//!         }
//!         ManagerEvent::Message(reply) => println!("{}", reply.answer),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::identifiers::{Epoch, TimerId};
use crate::manager::{ConnectionManager, ConnectionState, ManagerEvent, TimerSink, TokioClock};
use crate::protocol::OutboundMessage;
use crate::transport::{EventSink, TransportEvent, WebSocketFactory};

// ============================================================================
// Types
// ============================================================================

/// Stream of manager events for the UI.
pub type EventStream = mpsc::UnboundedReceiver<ManagerEvent>;

type Manager = ConnectionManager<WebSocketFactory, TokioClock>;

/// Everything the event loop reacts to.
enum Input {
    Connect(Url),
    Send {
        message: OutboundMessage,
        reply_tx: oneshot::Sender<Result<()>>,
    },
    Close,
    State(oneshot::Sender<ConnectionState>),
    Transport {
        epoch: Epoch,
        event: TransportEvent,
    },
    Timer(TimerId),
    Shutdown,
}

// ============================================================================
// ChatClient
// ============================================================================

/// Handle to a running chat event loop.
///
/// Cheap to clone. The loop stops on [`ChatClient::shutdown`] or when the
/// last handle is dropped; the connection is closed either way.
#[derive(Clone)]
pub struct ChatClient {
    input_tx: mpsc::UnboundedSender<Input>,
    url: Url,
}

impl ChatClient {
    /// Spawns the event loop for the configured chat endpoint.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the chat URL cannot be derived.
    pub fn spawn(config: &ClientConfig) -> Result<(Self, EventStream)> {
        let url = config.ws_url()?;
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        // Weak senders: internal producers must not keep the loop alive
        let transport_tx = input_tx.downgrade();
        let sink: EventSink = Arc::new(move |epoch, event| {
            if let Some(tx) = transport_tx.upgrade() {
                let _ = tx.send(Input::Transport { epoch, event });
            }
        });

        let timer_tx = input_tx.downgrade();
        let timer_sink: TimerSink = Arc::new(move |timer| {
            if let Some(tx) = timer_tx.upgrade() {
                let _ = tx.send(Input::Timer(timer));
            }
        });

        let factory = WebSocketFactory::new(sink, config.connect_timeout());
        let clock = TokioClock::new(timer_sink);
        let mut manager = ConnectionManager::new(factory, clock, config.retry());
        manager.subscribe(move |event| {
            let _ = event_tx.send(event.clone());
        });

        tokio::spawn(run_event_loop(manager, input_rx));

        Ok((Self { input_tx, url }, event_rx))
    }

    /// Returns the chat endpoint.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Connects to the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has stopped.
    pub fn connect(&self) -> Result<()> {
        self.connect_to(self.url.clone())
    }

    /// Connects to an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has stopped.
    pub fn connect_to(&self, url: Url) -> Result<()> {
        self.submit(Input::Connect(url))
    }

    /// Sends a message.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the manager is not connected
    /// - [`Error::ConnectionClosed`] if the event loop has stopped
    pub async fn send(&self, message: OutboundMessage) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Input::Send { message, reply_tx })?;
        reply_rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Closes the connection without stopping the event loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has stopped.
    pub fn close(&self) -> Result<()> {
        self.submit(Input::Close)
    }

    /// Returns the manager state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop has stopped.
    pub async fn state(&self) -> Result<ConnectionState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Input::State(reply_tx))?;
        reply_rx.await.map_err(|_| Error::ConnectionClosed)
    }

    /// Closes the connection and stops the event loop.
    pub fn shutdown(&self) {
        let _ = self.input_tx.send(Input::Shutdown);
    }

    fn submit(&self, input: Input) -> Result<()> {
        self.input_tx.send(input).map_err(|_| Error::ConnectionClosed)
    }
}

// ============================================================================
// Event Loop
// ============================================================================

async fn run_event_loop(mut manager: Manager, mut input_rx: mpsc::UnboundedReceiver<Input>) {
    while let Some(input) = input_rx.recv().await {
        match input {
            Input::Connect(url) => manager.connect(url),

            Input::Send { message, reply_tx } => {
                let _ = reply_tx.send(manager.send(&message));
            }

            Input::Close => manager.close(),

            Input::State(reply_tx) => {
                let _ = reply_tx.send(manager.state());
            }

            Input::Transport { epoch, event } => manager.handle_transport_event(epoch, event),

            Input::Timer(timer) => manager.handle_timer(timer),

            Input::Shutdown => {
                debug!("Shutdown command received");
                manager.close();
                break;
            }
        }
    }

    debug!("Chat event loop terminated");
}
