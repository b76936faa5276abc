//! Server listener
//!
//! Accepts TCP connections, upgrades them to WebSockets and hands each
//! upgraded socket to the session as a `PendingPeer`. The session decides
//! whether to attach it or terminate it.

use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

use crate::error::TransportError;
use crate::transport::connection::{Connection, ConnectionId, PeerEvent, attach};

/// An upgraded connection the session has not decided on yet.
pub trait Incoming {
    fn peer_addr(&self) -> Option<SocketAddr>;

    /// Start the reader/writer tasks and make this the session's peer.
    fn attach(self, id: ConnectionId, events: mpsc::UnboundedSender<PeerEvent>) -> Connection;

    /// Drop the socket without a closing handshake.
    fn terminate(self);
}

pub struct PendingPeer {
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
}

impl Incoming for PendingPeer {
    fn peer_addr(&self) -> Option<SocketAddr> {
        Some(self.addr)
    }

    fn attach(self, id: ConnectionId, events: mpsc::UnboundedSender<PeerEvent>) -> Connection {
        attach(self.ws, id, Some(self.addr), events)
    }

    fn terminate(self) {
        info!("Terminating extra connection from {}", self.addr);
        drop(self.ws);
    }
}

pub enum ListenerEvent<I = PendingPeer> {
    Connection(I),
    Error(TransportError),
}

pub struct Listener {
    listener: TcpListener,
    subprotocol: Option<String>,
}

impl Listener {
    pub async fn bind(addr: SocketAddr, subprotocol: Option<String>) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::bind(addr, &e))?;
        info!("Listener bound to {}", addr);
        Ok(Self {
            listener,
            subprotocol,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the accept loop on its own task. Each accepted socket is upgraded
    /// on a separate task so a slow handshake never blocks accepting.
    pub fn spawn(self) -> mpsc::UnboundedReceiver<ListenerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                match self.listener.accept().await {
                    Ok((stream, addr)) => {
                        debug!("Accepted TCP connection from {}", addr);
                        let tx = tx.clone();
                        let subprotocol = self.subprotocol.clone();
                        tokio::spawn(async move {
                            match accept_hdr_async(stream, negotiate(subprotocol)).await {
                                Ok(ws) => {
                                    let _ = tx.send(ListenerEvent::Connection(PendingPeer { ws, addr }));
                                }
                                Err(e) => warn!("WebSocket handshake with {} failed: {}", addr, e),
                            }
                        });
                    }
                    Err(e) if is_transient(&e) => {
                        warn!("Error accepting connection: {}", e);
                    }
                    Err(e) => {
                        error!("Listener failed: {}", e);
                        let _ = tx.send(ListenerEvent::Error(e.into()));
                        break;
                    }
                }
            }
        });

        rx
    }
}

/// Accept errors that concern a single connection rather than the listener.
fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset | io::ErrorKind::Interrupted
    )
}

/// Subprotocol selection: the configured protocol if the client offers it,
/// otherwise the client's first offer.
fn negotiate(
    subprotocol: Option<String>,
) -> impl FnOnce(&Request, Response) -> Result<Response, ErrorResponse> + Unpin {
    move |request: &Request, mut response: Response| {
        let offered: Vec<String> = request
            .headers()
            .get_all(SEC_WEBSOCKET_PROTOCOL)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(|protocol| protocol.trim().to_string())
            .filter(|protocol| !protocol.is_empty())
            .collect();

        let selected = match &subprotocol {
            Some(wanted) => offered.iter().find(|p| *p == wanted),
            None => offered.first(),
        };

        if let Some(protocol) = selected {
            if let Ok(value) = HeaderValue::from_str(protocol) {
                debug!("Selected subprotocol {}", protocol);
                response.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
            }
        }
        Ok(response)
    }
}
