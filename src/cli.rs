//! Command-line interface
//!
//! Parses the flags of `wscat` and selects the run mode. Exactly one of
//! `--listen` and `--connect` must be given; anything else is rejected before
//! the transport is touched.

use clap::Parser;

use crate::config::SessionOptions;
use crate::error::ConfigError;

/// Interactive WebSocket client and single-peer server
#[derive(Debug, Parser)]
#[command(author, name = "wscat", version, long_about = None)]
pub struct Cli {
    /// listen on port
    #[arg(short = 'l', long = "listen", value_name = "port")]
    pub listen: Option<u16>,

    /// connect to a websocket server
    #[arg(short = 'c', long = "connect", value_name = "url")]
    pub connect: Option<String>,

    /// optional protocol version
    #[arg(short = 'p', long = "protocol", value_name = "version")]
    pub protocol: Option<String>,

    /// optional origin
    #[arg(short = 'o', long = "origin", value_name = "origin")]
    pub origin: Option<String>,

    /// optional host
    #[arg(long = "host", value_name = "host")]
    pub host: Option<String>,

    /// optional subprotocol
    #[arg(short = 's', long = "subprotocol", value_name = "protocol")]
    pub subprotocol: Option<String>,

    /// Do not check for unauthorized certificates
    #[arg(short = 'n', long = "no-check")]
    pub no_check: bool,

    /// Set an HTTP header. Repeat to set multiple. (--connect only)
    #[arg(short = 'H', long = "header", value_name = "header:value")]
    pub header: Vec<String>,

    /// Add basic HTTP authentication header. (--connect only)
    #[arg(long = "auth", value_name = "username:password")]
    pub auth: Option<String>,
}

/// Which side of the connection this process plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Client { url: String },
    Server { port: u16 },
}

impl Cli {
    /// Select the run mode, rejecting both or neither of listen/connect.
    pub fn mode(&self) -> Result<Mode, ConfigError> {
        match (self.listen, &self.connect) {
            (Some(_), Some(_)) => Err(ConfigError::ModeConflict),
            (None, None) => Err(ConfigError::ModeMissing),
            (Some(port), None) => Ok(Mode::Server { port }),
            (None, Some(url)) => Ok(Mode::Client { url: url.clone() }),
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            protocol_version: self.protocol.clone(),
            origin: self.origin.clone(),
            subprotocol: self.subprotocol.clone(),
            host: self.host.clone(),
            check_certificates: !self.no_check,
            headers: self.header.clone(),
            auth: self.auth.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wscat").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_listen_selects_server() {
        assert_eq!(parse(&["-l", "8080"]).mode().unwrap(), Mode::Server { port: 8080 });
    }

    #[test]
    fn test_connect_selects_client() {
        let cli = parse(&["--connect", "ws://localhost:8080"]);
        assert_eq!(
            cli.mode().unwrap(),
            Mode::Client {
                url: "ws://localhost:8080".into()
            }
        );
    }

    #[test]
    fn test_both_modes_rejected() {
        let cli = parse(&["-l", "8080", "-c", "ws://localhost:8080"]);
        assert!(matches!(cli.mode(), Err(ConfigError::ModeConflict)));
    }

    #[test]
    fn test_no_mode_rejected() {
        assert!(matches!(parse(&[]).mode(), Err(ConfigError::ModeMissing)));
    }

    #[test]
    fn test_repeated_headers_and_options() {
        let cli = parse(&[
            "-c",
            "wss://example.com",
            "-H",
            "X-One: 1",
            "--header",
            "X-Two:2",
            "-n",
            "-o",
            "http://origin",
            "--host",
            "other.example",
            "-s",
            "chat",
            "-p",
            "8",
            "--auth",
            "alice:secret",
        ]);
        let options = cli.session_options();
        assert_eq!(options.headers, vec!["X-One: 1", "X-Two:2"]);
        assert!(!options.check_certificates);
        assert_eq!(options.origin.as_deref(), Some("http://origin"));
        assert_eq!(options.host.as_deref(), Some("other.example"));
        assert_eq!(options.subprotocol.as_deref(), Some("chat"));
        assert_eq!(options.protocol_version.as_deref(), Some("8"));
        assert_eq!(options.auth.as_deref(), Some("alice:secret"));
    }

    #[test]
    fn test_certificates_checked_by_default() {
        assert!(parse(&["-l", "1"]).session_options().check_certificates);
    }
}
