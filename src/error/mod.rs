//! Error handling
//!
//! Defines error types and exit-code handling for wscat.

pub mod handlers;
pub mod types;

pub use types::*;
