//! Basic authentication
//!
//! Encodes `user:password` credentials for the `Authorization` header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Returns the `Authorization` header value for `user:password` credentials.
///
/// The credential string is encoded as given; a missing `:` is not an error,
/// the server decides what to make of it.
pub fn basic_authorization(credentials: &str) -> String {
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_authorization() {
        assert_eq!(basic_authorization("alice:secret"), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_password_with_colon_kept_verbatim() {
        // base64("bob:pa:ss")
        assert_eq!(basic_authorization("bob:pa:ss"), "Basic Ym9iOnBhOnNz");
    }
}
