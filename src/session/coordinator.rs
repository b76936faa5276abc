//! Session coordinator
//!
//! Every console, peer and listener event goes through one `Session` value.
//! Handlers run one at a time on the event loop, so the peer slot needs no
//! locking. Each handler returns a `Flow` telling the loop whether to keep
//! going or exit with a status code.

use log::{debug, info, warn};
use std::io::{Stdout, Write};
use tokio::sync::mpsc;

use crate::cli::Mode;
use crate::console::{Color, Console, ConsoleEvent};
use crate::error::TransportError;
use crate::error::handlers::{EXIT_FAILURE, EXIT_OK};
use crate::session::state::{Flow, SessionState};
use crate::transport::{Connection, ConnectionId, Incoming, PeerEvent};

pub struct Session<W: Write = Stdout> {
    mode: Mode,
    state: SessionState,
    peer: Option<Connection>,
    console: Console<W>,
    next_id: ConnectionId,
}

impl<W: Write> Session<W> {
    pub fn new(mode: Mode, console: Console<W>) -> Self {
        Self {
            mode,
            state: SessionState::Idle,
            peer: None,
            console,
            next_id: 1,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn peer(&self) -> Option<&Connection> {
        self.peer.as_ref()
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }

    fn is_server(&self) -> bool {
        matches!(self.mode, Mode::Server { .. })
    }

    fn set_state(&mut self, next: SessionState) {
        if self.state.is_closed() {
            debug!("Session already closed, ignoring transition to {:?}", next);
            return;
        }
        debug!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Id for the next connection this session attaches.
    pub fn next_connection_id(&mut self) -> ConnectionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // --------------------
    // Client lifecycle
    // --------------------

    /// Start of either mode: a client dialing out or a server binding.
    pub fn begin_connecting(&mut self) {
        self.set_state(SessionState::Connecting);
    }

    /// The client handshake completed.
    pub fn on_open(&mut self, connection: Connection) -> Flow {
        info!("Connected (connection {})", connection.id());
        self.peer = Some(connection);
        self.set_state(SessionState::Open);
        self.console.print("connected (press CTRL+C to quit)", Color::Green);
        Flow::Continue
    }

    // --------------------
    // Server lifecycle
    // --------------------

    /// The listener is bound. Input stays paused until a peer attaches.
    pub fn on_listening(&mut self, port: u16) -> Flow {
        self.console.pause();
        self.set_state(SessionState::Accepting);
        self.console.print(
            &format!("listening on port {} (press CTRL+C to quit)", port),
            Color::Green,
        );
        self.console.clear();
        Flow::Continue
    }

    /// An upgraded socket arrived. Only the first one is attached; any other
    /// is terminated while a peer is present.
    pub fn on_connection<I: Incoming>(
        &mut self,
        incoming: I,
        events: &mpsc::UnboundedSender<PeerEvent>,
    ) -> Flow {
        if self.peer.is_some() {
            info!(
                "Rejecting {:?}: a client is already connected",
                incoming.peer_addr()
            );
            incoming.terminate();
            return Flow::Continue;
        }

        let id = self.next_connection_id();
        let connection = incoming.attach(id, events.clone());
        info!(
            "Client {:?} connected (connection {})",
            connection.peer_addr(),
            id
        );
        self.peer = Some(connection);
        self.set_state(SessionState::Open);
        self.console.resume();
        self.console.prompt();
        self.console.print("client connected", Color::Green);
        Flow::Continue
    }

    // --------------------
    // Transport events
    // --------------------

    /// Connect failure, bind failure or listener failure: always fatal.
    pub fn on_transport_error(&mut self, error: &TransportError) -> Flow {
        self.print_error(error);
        self.set_state(SessionState::Closed);
        Flow::Exit(EXIT_FAILURE)
    }

    pub fn on_peer_event(&mut self, event: PeerEvent) -> Flow {
        let attached = self.peer.as_ref().map(Connection::id);
        if attached != Some(event.connection_id()) {
            debug!("Ignoring event from detached connection: {:?}", event);
            return Flow::Continue;
        }

        match event {
            PeerEvent::Message(_, payload) => {
                let color = if self.is_server() { Color::Blue } else { Color::Cyan };
                self.console.print(&format!("< {}", payload), color);
                Flow::Continue
            }
            PeerEvent::Error(_, error) => {
                self.print_error(&error);
                if self.is_server() {
                    Flow::Continue
                } else {
                    self.peer = None;
                    self.set_state(SessionState::Closed);
                    Flow::Exit(EXIT_FAILURE)
                }
            }
            PeerEvent::Close(id) => {
                info!("Connection {} disconnected", id);
                self.console.print("disconnected", Color::Green);
                self.console.clear();
                self.peer = None;
                if self.is_server() {
                    self.console.pause();
                    self.set_state(SessionState::Accepting);
                    Flow::Continue
                } else {
                    self.set_state(SessionState::Closed);
                    Flow::Exit(EXIT_OK)
                }
            }
        }
    }

    // --------------------
    // Console events
    // --------------------

    pub fn on_console_event(&mut self, event: ConsoleEvent) -> Flow {
        match event {
            ConsoleEvent::Line(line) => {
                self.on_line(line);
                Flow::Continue
            }
            ConsoleEvent::Close => self.on_console_close(),
        }
    }

    fn on_line(&mut self, line: String) {
        let Some(line) = self.console.accept_line(line) else {
            return;
        };

        match &self.peer {
            Some(peer) => {
                if let Err(e) = peer.send(line) {
                    warn!("Failed to queue line for connection {}: {}", peer.id(), e);
                }
                self.console.prompt();
            }
            None => debug!("No peer attached, line not sent"),
        }
    }

    /// End of input or interrupt: close the peer if any, then exit cleanly.
    fn on_console_close(&mut self) -> Flow {
        if let Some(peer) = self.peer.take() {
            if let Err(e) = peer.close() {
                debug!("Ignoring error while closing connection {}: {}", peer.id(), e);
            }
        }
        self.set_state(SessionState::Closed);
        Flow::Exit(EXIT_OK)
    }

    fn print_error(&mut self, error: &TransportError) {
        warn!("Transport error: {}", error);
        self.console.print(&format!("error: {}", error), Color::Yellow);
    }
}
