//! Configuration management for wscat
//!
//! Separates console/listener settings (loaded from an optional settings file
//! and the environment) from per-invocation session options (taken from the
//! command line).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use crate::error::ConfigError;

/// Settings file name looked up in the working directory (`wscat.toml`).
const SETTINGS_FILE: &str = "wscat";
const ENV_PREFIX: &str = "WSCAT";

/// Settings that shape the terminal and the listener but never the handshake.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Prompt drawn after every printed line
    /// Environment: WSCAT_PROMPT
    pub prompt: String,

    /// Emit ANSI color codes
    /// Environment: WSCAT_COLOR
    pub color: bool,

    /// Interface the server binds to
    /// Environment: WSCAT_BIND_ADDRESS
    pub bind_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            color: true,
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

impl Settings {
    /// Load `wscat.toml` (if present) with `WSCAT_*` environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(SETTINGS_FILE).required(false))
    }

    /// Load settings from an explicit file, still honouring the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Settings::default();
        let settings = Config::builder()
            .set_default("prompt", defaults.prompt)?
            .set_default("color", defaults.color)?
            .set_default("bind_address", defaults.bind_address)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.prompt.contains(['\r', '\n']) {
            return Err(config::ConfigError::Message("prompt cannot contain a line break".into()).into());
        }

        if self.bind_address.parse::<IpAddr>().is_err() {
            return Err(config::ConfigError::Message(format!(
                "bind_address '{}' is not an IP address",
                self.bind_address
            ))
            .into());
        }

        Ok(())
    }

    /// Socket address the server listens on for `port`
    pub fn listen_socket(&self, port: u16) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| config::ConfigError::Message("invalid bind_address".into()))?;
        Ok(SocketAddr::new(ip, port))
    }
}

/// Handshake and TLS options for one session, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub protocol_version: Option<String>,
    pub origin: Option<String>,
    pub subprotocol: Option<String>,
    pub host: Option<String>,
    pub check_certificates: bool,
    pub headers: Vec<String>,
    pub auth: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            protocol_version: None,
            origin: None,
            subprotocol: None,
            host: None,
            check_certificates: true,
            headers: Vec::new(),
            auth: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.prompt, "> ");
        assert!(settings.color);
        assert_eq!(
            settings.listen_socket(8080).unwrap(),
            "0.0.0.0:8080".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = settings_file("prompt = \"ws> \"\ncolor = false\nbind_address = \"127.0.0.1\"\n");
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.prompt, "ws> ");
        assert!(!settings.color);
        assert_eq!(settings.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let file = settings_file("color = false\n");
        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.prompt, "> ");
        assert!(!settings.color);
    }

    #[test]
    fn test_rejects_bad_bind_address() {
        let file = settings_file("bind_address = \"not-an-ip\"\n");
        assert!(Settings::load_from(file.path()).is_err());
    }

    #[test]
    fn test_session_options_check_certificates_by_default() {
        assert!(SessionOptions::default().check_certificates);
    }
}
