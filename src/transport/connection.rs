//! Live connection handle
//!
//! An attached socket is split into a reader task, which reports inbound
//! messages as `PeerEvent`s, and a writer task draining the `Connection`'s
//! outbound queue. Client-role frames are masked and server-role frames are
//! not; the transport applies this from the role the socket was opened with.

use futures::{SinkExt, StreamExt};
use log::{debug, info};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::error::TransportError;

pub type ConnectionId = u64;

/// Events reported by an attached connection, tagged with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    Message(ConnectionId, String),
    Close(ConnectionId),
    Error(ConnectionId, TransportError),
}

impl PeerEvent {
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            PeerEvent::Message(id, _) | PeerEvent::Close(id) | PeerEvent::Error(id, _) => *id,
        }
    }
}

/// Work queued for the writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close,
}

/// Handle to an attached socket. Dropping it lets the writer task finish.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    peer_addr: Option<SocketAddr>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        peer_addr: Option<SocketAddr>,
        outbound: mpsc::UnboundedSender<Outbound>,
    ) -> Self {
        Self {
            id,
            peer_addr,
            outbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Queue a text frame.
    pub fn send(&self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Text(text))
            .map_err(|_| TransportError::new("connection closed", None))
    }

    /// Start the closing handshake.
    pub fn close(&self) -> Result<(), TransportError> {
        self.outbound
            .send(Outbound::Close)
            .map_err(|_| TransportError::new("connection closed", None))
    }
}

/// Spawn the reader and writer tasks for `ws` and return its handle.
pub fn attach<S>(
    ws: WebSocketStream<S>,
    id: ConnectionId,
    peer_addr: Option<SocketAddr>,
    events: mpsc::UnboundedSender<PeerEvent>,
) -> Connection
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sink, mut stream) = ws.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();

    let writer_events = events.clone();
    tokio::spawn(async move {
        while let Some(outbound) = outbound_rx.recv().await {
            match outbound {
                Outbound::Text(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        let _ = writer_events.send(PeerEvent::Error(id, e.into()));
                        break;
                    }
                }
                Outbound::Close => {
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        debug!("Connection {} close frame not sent: {}", id, e);
                    }
                    break;
                }
            }
        }
    });

    tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let _ = events.send(PeerEvent::Message(id, text.as_str().to_string()));
                }
                Ok(Message::Binary(data)) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    let _ = events.send(PeerEvent::Message(id, text));
                }
                Ok(_) => {}
                Err(e) if is_plain_close(&e) => break,
                Err(e) => {
                    let _ = events.send(PeerEvent::Error(id, e.into()));
                    break;
                }
            }
        }
        info!("Connection {} closed", id);
        let _ = events.send(PeerEvent::Close(id));
    });

    Connection::new(id, peer_addr, outbound_tx)
}

/// A peer vanishing without a closing handshake is reported as a close, not
/// an error.
fn is_plain_close(error: &WsError) -> bool {
    matches!(
        error,
        WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
    )
}
