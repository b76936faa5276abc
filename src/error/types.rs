//! Error types
//!
//! Defines the error taxonomy of the tool: configuration problems detected
//! before any network activity, and transport failures reported by the
//! WebSocket collaborator.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use tokio_tungstenite::tungstenite;

/// Errors detected while turning arguments and settings into a session.
#[derive(Debug)]
pub enum ConfigError {
    /// Both `--listen` and `--connect` were given.
    ModeConflict,
    /// Neither `--listen` nor `--connect` was given.
    ModeMissing,
    /// A `-H` argument without a `:` separator.
    MalformedHeader(String),
    /// A header name or value rejected by the HTTP layer.
    InvalidHeader { name: String, reason: String },
    InvalidUrl(String),
    Settings(config::ConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ModeConflict | ConfigError::ModeMissing => {
                write!(f, "use either --listen or --connect")
            }
            ConfigError::MalformedHeader(h) => {
                write!(f, "malformed header '{}', expected header:value", h)
            }
            ConfigError::InvalidHeader { name, reason } => {
                write!(f, "invalid header '{}': {}", name, reason)
            }
            ConfigError::InvalidUrl(msg) => write!(f, "invalid url: {}", msg),
            ConfigError::Settings(e) => write!(f, "settings: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(error: config::ConfigError) -> Self {
        ConfigError::Settings(error)
    }
}

/// A failure reported by the transport, printed as `code` plus an optional
/// description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub code: String,
    pub description: Option<String>,
}

impl TransportError {
    pub fn new(code: impl Into<String>, description: Option<String>) -> Self {
        Self {
            code: code.into(),
            description,
        }
    }

    /// Listener could not be bound to `addr`.
    pub fn bind(addr: SocketAddr, error: &io::Error) -> Self {
        Self::new(
            format!("{:?}", error.kind()),
            Some(format!("failed to bind {}: {}", addr, error)),
        )
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} {}", self.code, description),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::new(format!("{:?}", error.kind()), Some(error.to_string()))
    }
}

impl From<tungstenite::Error> for TransportError {
    fn from(error: tungstenite::Error) -> Self {
        match error {
            tungstenite::Error::Io(e) => e.into(),
            tungstenite::Error::Http(response) => {
                let status = response.status();
                TransportError::new(
                    format!("unexpected server response ({})", status.as_u16()),
                    status.canonical_reason().map(str::to_string),
                )
            }
            tungstenite::Error::Url(e) => TransportError::new("invalid url", Some(e.to_string())),
            tungstenite::Error::Protocol(e) => {
                TransportError::new("protocol error", Some(e.to_string()))
            }
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::new("connection closed", None)
            }
            other => TransportError::new(other.to_string(), None),
        }
    }
}

/// Top-level error returned from `main`'s session runner.
#[derive(Debug)]
pub enum WscatError {
    Config(ConfigError),
    Transport(TransportError),
    IoError(io::Error),
}

impl fmt::Display for WscatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WscatError::Config(e) => write!(f, "{}", e),
            WscatError::Transport(e) => write!(f, "{}", e),
            WscatError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for WscatError {}

impl From<ConfigError> for WscatError {
    fn from(error: ConfigError) -> Self {
        WscatError::Config(error)
    }
}

impl From<TransportError> for WscatError {
    fn from(error: TransportError) -> Self {
        WscatError::Transport(error)
    }
}

impl From<io::Error> for WscatError {
    fn from(error: io::Error) -> Self {
        WscatError::IoError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display_with_description() {
        let err = TransportError::new("ConnectionRefused", Some("connection refused".into()));
        assert_eq!(err.to_string(), "ConnectionRefused connection refused");
    }

    #[test]
    fn test_transport_error_display_code_only() {
        let err = TransportError::new("connection closed", None);
        assert_eq!(err.to_string(), "connection closed");
    }

    #[test]
    fn test_io_error_keeps_kind_as_code() {
        let io = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let err: TransportError = io.into();
        assert_eq!(err.code, "ConnectionRefused");
        assert_eq!(err.description.as_deref(), Some("refused"));
    }

    #[test]
    fn test_mode_errors_share_usage_message() {
        assert_eq!(
            ConfigError::ModeConflict.to_string(),
            ConfigError::ModeMissing.to_string()
        );
    }
}
