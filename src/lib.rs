pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod handshake;
pub mod session;
pub mod transport;

pub use session::Session;
