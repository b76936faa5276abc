//! Error handlers
//!
//! Maps errors to process exit codes and logs them.

use crate::error::types::WscatError;
use log::error;

/// Exit status for a graceful close.
pub const EXIT_OK: i32 = 0;
/// Exit status for configuration and transport failures.
pub const EXIT_FAILURE: i32 = 1;

/// Log an error that ends the session
pub fn handle_error(err: &WscatError) {
    error!("wscat error: {}", err);
}

/// Convert error to process exit code
pub fn exit_code(err: &WscatError) -> i32 {
    match err {
        WscatError::Config(_) => EXIT_FAILURE,
        WscatError::Transport(_) => EXIT_FAILURE,
        WscatError::IoError(_) => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, TransportError};

    #[test]
    fn test_every_error_is_a_failure_exit() {
        assert_ne!(exit_code(&ConfigError::ModeMissing.into()), EXIT_OK);
        assert_ne!(
            exit_code(&TransportError::new("x", None).into()),
            EXIT_OK
        );
    }
}
