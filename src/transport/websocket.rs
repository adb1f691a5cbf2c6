//! WebSocket transport built on tokio-tungstenite.
//!
//! Each [`WebSocketChannel`] is backed by one spawned task that performs the
//! handshake and then multiplexes socket reads with commands from the
//! channel handle.
//!
//! # Event Order
//!
//! A channel emits, in order:
//!
//! - `Opened` (only if the handshake succeeds) or `Error`
//! - any number of `Message` / `Error`
//! - exactly one `Closed`

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::error::Result;
use crate::identifiers::Epoch;

use super::{Channel, EventSink, TransportEvent, TransportFactory};

// ============================================================================
// Types
// ============================================================================

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Commands from the channel handle to its I/O task.
enum ChannelCommand {
    /// Write a text frame.
    Send(String),
    /// Send a close frame and stop.
    Close,
}

// ============================================================================
// WebSocketFactory
// ============================================================================

/// Opens [`WebSocketChannel`]s.
///
/// Requires a running tokio runtime.
pub struct WebSocketFactory {
    /// Where channel tasks report events.
    sink: EventSink,
    /// Handshake timeout.
    connect_timeout: Duration,
}

impl WebSocketFactory {
    /// Creates a factory reporting into `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: EventSink, connect_timeout: Duration) -> Self {
        Self {
            sink,
            connect_timeout,
        }
    }
}

impl TransportFactory for WebSocketFactory {
    type Channel = WebSocketChannel;

    fn open(&mut self, url: &Url, epoch: Epoch) -> Result<WebSocketChannel> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_channel(
            url.clone(),
            epoch,
            self.connect_timeout,
            command_rx,
            self.sink.clone(),
        ));

        debug!(%url, %epoch, "WebSocket channel task spawned");

        Ok(WebSocketChannel { command_tx })
    }
}

// ============================================================================
// WebSocketChannel
// ============================================================================

/// Handle to a WebSocket I/O task.
///
/// Dropping the handle closes the socket.
pub struct WebSocketChannel {
    command_tx: mpsc::UnboundedSender<ChannelCommand>,
}

impl Channel for WebSocketChannel {
    fn send_text(&mut self, text: String) {
        if self.command_tx.send(ChannelCommand::Send(text)).is_err() {
            trace!("Send on finished channel task");
        }
    }

    fn close(&mut self) {
        let _ = self.command_tx.send(ChannelCommand::Close);
    }
}

// ============================================================================
// Channel Task
// ============================================================================

/// Drives one channel from handshake to close.
async fn run_channel(
    url: Url,
    epoch: Epoch,
    connect_timeout: Duration,
    mut command_rx: mpsc::UnboundedReceiver<ChannelCommand>,
    sink: EventSink,
) {
    let socket = tokio::select! {
        result = timeout(connect_timeout, connect_async(url.as_str())) => {
            match result {
                Ok(Ok((socket, _response))) => socket,
                Ok(Err(e)) => {
                    warn!(%url, %epoch, error = %e, "WebSocket handshake failed");
                    sink(epoch, TransportEvent::Error(e.to_string()));
                    sink(epoch, TransportEvent::closed(None, "handshake failed"));
                    return;
                }
                Err(_) => {
                    let message = format!(
                        "handshake timed out after {}ms",
                        connect_timeout.as_millis()
                    );
                    warn!(%url, %epoch, "WebSocket {message}");
                    sink(epoch, TransportEvent::Error(message));
                    sink(epoch, TransportEvent::closed(None, "handshake timed out"));
                    return;
                }
            }
        }

        // Close requested (or handle dropped) while still connecting
        _ = wait_for_close(&mut command_rx) => {
            debug!(%epoch, "Connect aborted by client");
            sink(epoch, TransportEvent::closed(None, "aborted before open"));
            return;
        }
    };

    info!(%url, %epoch, "WebSocket connection established");
    sink(epoch, TransportEvent::Opened);

    let (code, reason) = run_open_channel(socket, epoch, &mut command_rx, &sink).await;

    debug!(%epoch, ?code, %reason, "Channel task terminated");
    sink(epoch, TransportEvent::Closed { code, reason });
}

/// Event loop of an open socket. Returns the close code and reason.
async fn run_open_channel(
    socket: Socket,
    epoch: Epoch,
    command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>,
    sink: &EventSink,
) -> (Option<u16>, String) {
    let (mut ws_write, mut ws_read) = socket.split();

    loop {
        tokio::select! {
            // Incoming frames from the server
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        trace!(%epoch, len = text.len(), "Text frame received");
                        sink(epoch, TransportEvent::Message(text.as_str().to_string()));
                    }

                    Some(Ok(Message::Close(frame))) => {
                        debug!(%epoch, "WebSocket closed by remote");
                        return match frame {
                            Some(frame) => {
                                (Some(u16::from(frame.code)), frame.reason.as_str().to_string())
                            }
                            None => (None, "closed by remote".to_string()),
                        };
                    }

                    Some(Err(e)) => {
                        warn!(%epoch, error = %e, "WebSocket error");
                        sink(epoch, TransportEvent::Error(e.to_string()));
                        return (None, e.to_string());
                    }

                    None => {
                        debug!(%epoch, "WebSocket stream ended");
                        return (None, "stream ended".to_string());
                    }

                    // Ignore Binary, Ping, Pong, Frame
                    _ => {}
                }
            }

            // Commands from the channel handle
            command = command_rx.recv() => {
                match command {
                    Some(ChannelCommand::Send(text)) => {
                        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                            warn!(%epoch, error = %e, "Failed to write frame");
                            sink(epoch, TransportEvent::Error(e.to_string()));
                        }
                    }

                    Some(ChannelCommand::Close) | None => {
                        debug!(%epoch, "Close requested by client");
                        let _ = ws_write.close().await;
                        return (Some(1000), "closed by client".to_string());
                    }
                }
            }
        }
    }
}

/// Resolves once a close command arrives or the handle is dropped.
///
/// Frames queued before open are discarded; the manager never sends
/// before `Opened`.
async fn wait_for_close(command_rx: &mut mpsc::UnboundedReceiver<ChannelCommand>) {
    loop {
        match command_rx.recv().await {
            Some(ChannelCommand::Close) | None => return,
            Some(ChannelCommand::Send(_)) => trace!("Frame dropped before open"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
