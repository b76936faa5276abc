//! Upgrade request builder
//!
//! Starts from the request the transport derives from the URL (key, version,
//! host, upgrade headers) and layers the session options on top. Custom `-H`
//! headers override the built-in ones; `--auth` overrides any custom
//! `Authorization`.

use log::debug;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{self, HeaderName, HeaderValue};

use crate::config::SessionOptions;
use crate::error::ConfigError;
use crate::handshake::{basic_authorization, parse_header};

/// Build the client upgrade request for `url`.
pub fn build_request(url: &str, options: &SessionOptions) -> Result<Request, ConfigError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

    let headers = request.headers_mut();

    if let Some(version) = &options.protocol_version {
        headers.insert(
            header::SEC_WEBSOCKET_VERSION,
            header_value(header::SEC_WEBSOCKET_VERSION.as_str(), version)?,
        );
    }
    if let Some(origin) = &options.origin {
        headers.insert(header::ORIGIN, header_value(header::ORIGIN.as_str(), origin)?);
    }
    if let Some(host) = &options.host {
        headers.insert(header::HOST, header_value(header::HOST.as_str(), host)?);
    }
    if let Some(subprotocol) = &options.subprotocol {
        headers.insert(
            header::SEC_WEBSOCKET_PROTOCOL,
            header_value(header::SEC_WEBSOCKET_PROTOCOL.as_str(), subprotocol)?,
        );
    }

    for raw in &options.headers {
        let (name, value) = parse_header(raw)?;
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value(&name, &value)?);
    }

    if let Some(credentials) = &options.auth {
        headers.insert(
            header::AUTHORIZATION,
            header_value(header::AUTHORIZATION.as_str(), &basic_authorization(credentials))?,
        );
    }

    debug!("Upgrade request for {}: {:?}", url, request.headers());
    Ok(request)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_plain_url_gets_transport_defaults() {
        let request = build_request("ws://localhost:8080", &SessionOptions::default()).unwrap();
        assert_eq!(header(&request, "host"), Some("localhost:8080"));
        assert_eq!(header(&request, "sec-websocket-version"), Some("13"));
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_auth_adds_basic_authorization() {
        let options = SessionOptions {
            auth: Some("alice:secret".into()),
            ..SessionOptions::default()
        };
        let request = build_request("ws://localhost:8080", &options).unwrap();
        assert_eq!(
            header(&request, "authorization"),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
    }

    #[test]
    fn test_overrides_and_custom_headers() {
        let options = SessionOptions {
            protocol_version: Some("8".into()),
            origin: Some("http://example.com".into()),
            host: Some("virtual.example".into()),
            subprotocol: Some("chat".into()),
            headers: vec!["X-Token: abc".into(), "X-Token: def".into()],
            ..SessionOptions::default()
        };
        let request = build_request("ws://localhost:8080/path", &options).unwrap();
        assert_eq!(header(&request, "sec-websocket-version"), Some("8"));
        assert_eq!(header(&request, "origin"), Some("http://example.com"));
        assert_eq!(header(&request, "host"), Some("virtual.example"));
        assert_eq!(header(&request, "sec-websocket-protocol"), Some("chat"));
        assert_eq!(header(&request, "x-token"), Some("def"));
        assert_eq!(request.uri().path(), "/path");
    }

    #[test]
    fn test_auth_wins_over_custom_authorization() {
        let options = SessionOptions {
            headers: vec!["Authorization: Bearer token".into()],
            auth: Some("alice:secret".into()),
            ..SessionOptions::default()
        };
        let request = build_request("ws://localhost:8080", &options).unwrap();
        assert_eq!(
            header(&request, "authorization"),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            build_request("not a url", &SessionOptions::default()),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let options = SessionOptions {
            headers: vec!["Bad Name: x".into()],
            ..SessionOptions::default()
        };
        assert!(matches!(
            build_request("ws://localhost", &options),
            Err(ConfigError::InvalidHeader { .. })
        ));
    }
}
