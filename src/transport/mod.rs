//! WebSocket transport
//!
//! Thin adapter over `tokio-tungstenite`: connecting as a client, accepting
//! as a server, and exposing each live socket as a `Connection` handle plus a
//! stream of events tagged with the connection id.

pub mod client;
pub mod connection;
pub mod server;
pub mod tls;

pub use client::connect;
pub use connection::{Connection, ConnectionId, Outbound, PeerEvent, attach};
pub use server::{Incoming, Listener, ListenerEvent, PendingPeer};
