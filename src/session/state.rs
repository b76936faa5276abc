//! Session state
//!
//! `Idle -> Connecting -> Open -> Closed` for clients. Servers go
//! `Idle -> Connecting -> Accepting <-> Open`, where `Connecting` covers the
//! bind, and only reach `Closed` when the console closes or the listener
//! fails.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    /// Listening with no peer attached.
    Accepting,
    Open,
    Closed,
}

impl SessionState {
    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}

/// What the event loop does after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}
