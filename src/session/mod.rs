//! Session coordination
//!
//! Owns the single peer slot and routes events between the console and the
//! transport for one client or server session.

pub mod coordinator;
pub mod runner;
pub mod state;

pub use coordinator::Session;
pub use runner::{run, run_client, run_server, serve};
pub use state::{Flow, SessionState};
