//! Client connect
//!
//! Opens the socket and runs the upgrade handshake for a prepared request.

use log::{debug, info};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};

use crate::error::TransportError;
use crate::transport::tls;

pub type ClientStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connect to the server addressed by `request`'s URI. `check_certificates`
/// only matters for `wss://`.
pub async fn connect(request: Request, check_certificates: bool) -> Result<ClientStream, TransportError> {
    info!("Connecting to {}", request.uri());

    let connector = tls::connector(check_certificates)?;
    let (ws, response) = connect_async_tls_with_config(request, None, false, connector).await?;

    debug!("Handshake completed with status {}", response.status());
    Ok(ws)
}
