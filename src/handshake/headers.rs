//! Custom header parsing
//!
//! `-H name:value` arguments are split at the first `:`. Everything after it
//! belongs to the value, so values may contain further colons (URLs, times).

use crate::error::ConfigError;

/// Split a `name:value` argument into its trimmed name and value.
pub fn parse_header(raw: &str) -> Result<(String, String), ConfigError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| ConfigError::MalformedHeader(raw.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::MalformedHeader(raw.to_string()));
    }

    Ok((name.to_string(), value.trim().to_string()))
}
