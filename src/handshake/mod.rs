//! Client handshake construction
//!
//! Turns session options into the HTTP upgrade request sent by the client:
//! origin, host and version overrides, subprotocol, custom headers and basic
//! authentication.

pub mod auth;
pub mod headers;
pub mod request;

pub use auth::basic_authorization;
pub use headers::parse_header;
pub use request::build_request;
