//! Session event loops
//!
//! Drives a `Session` from the console, the peer connection and (in server
//! mode) the listener. All sources are polled from one task, so handlers
//! never run concurrently.

use log::info;
use std::io::Write;
use tokio::sync::mpsc;

use crate::cli::Mode;
use crate::config::{SessionOptions, Settings};
use crate::console::{Console, ConsoleInput};
use crate::error::WscatError;
use crate::handshake::build_request;
use crate::session::coordinator::Session;
use crate::session::state::Flow;
use crate::transport::{self, Listener, ListenerEvent, PeerEvent, attach};

/// Run one session on the process terminal and return the exit status.
pub async fn run(mode: Mode, options: SessionOptions, settings: Settings) -> Result<i32, WscatError> {
    let console = Console::stdout(&settings);
    let mut input = ConsoleInput::stdin();
    let mut session = Session::new(mode.clone(), console);

    match mode {
        Mode::Client { url } => run_client(&mut session, &mut input, &url, &options).await,
        Mode::Server { port } => {
            let addr = settings.listen_socket(port)?;
            run_server(&mut session, &mut input, addr, &options).await
        }
    }
}

/// Connect to `url` and relay until the peer or the console closes.
///
/// The upgrade request is validated before any socket is opened.
pub async fn run_client<W: Write>(
    session: &mut Session<W>,
    input: &mut ConsoleInput,
    url: &str,
    options: &SessionOptions,
) -> Result<i32, WscatError> {
    let request = build_request(url, options)?;
    session.begin_connecting();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let connecting = transport::connect(request, options.check_certificates);
    tokio::pin!(connecting);

    loop {
        let flow = tokio::select! {
            result = &mut connecting => match result {
                Ok(ws) => {
                    let id = session.next_connection_id();
                    let connection = attach(ws, id, None, events_tx.clone());
                    session.on_open(connection)
                }
                Err(e) => session.on_transport_error(&e),
            },
            event = input.next_event() => match session.on_console_event(event) {
                Flow::Continue => continue,
                exit => exit,
            },
        };

        match flow {
            Flow::Continue => break,
            Flow::Exit(code) => return Ok(code),
        }
    }

    loop {
        let flow = tokio::select! {
            event = input.next_event() => session.on_console_event(event),
            Some(event) = events_rx.recv() => session.on_peer_event(event),
        };
        if let Flow::Exit(code) = flow {
            return Ok(finish(code).await);
        }
    }
}

/// Bind `addr` and serve one peer at a time until the console closes.
pub async fn run_server<W: Write>(
    session: &mut Session<W>,
    input: &mut ConsoleInput,
    addr: std::net::SocketAddr,
    options: &SessionOptions,
) -> Result<i32, WscatError> {
    session.begin_connecting();
    match Listener::bind(addr, options.subprotocol.clone()).await {
        Ok(listener) => serve(session, input, listener).await,
        Err(e) => match session.on_transport_error(&e) {
            Flow::Exit(code) => Ok(code),
            Flow::Continue => Err(e.into()),
        },
    }
}

/// Serve on an already bound listener.
pub async fn serve<W: Write>(
    session: &mut Session<W>,
    input: &mut ConsoleInput,
    listener: Listener,
) -> Result<i32, WscatError> {
    let port = listener.local_addr()?.port();
    session.on_listening(port);

    let mut connections = listener.spawn();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<PeerEvent>();

    loop {
        let flow = tokio::select! {
            event = input.next_event() => session.on_console_event(event),
            Some(event) = events_rx.recv() => session.on_peer_event(event),
            Some(event) = connections.recv() => match event {
                ListenerEvent::Connection(incoming) => session.on_connection(incoming, &events_tx),
                ListenerEvent::Error(e) => session.on_transport_error(&e),
            },
        };
        if let Flow::Exit(code) = flow {
            return Ok(finish(code).await);
        }
    }
}

/// Give writer tasks a turn to flush a pending close frame before exit.
async fn finish(code: i32) -> i32 {
    tokio::task::yield_now().await;
    info!("Session finished with status {}", code);
    code
}
