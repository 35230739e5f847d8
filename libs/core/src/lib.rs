//! Webdesk Core - shared configuration for the Web Access connector
//!
//! Holds the immutable [`ConnectionInfo`] every request orchestrator reads
//! from, plus the configuration error type.

pub mod config;
pub mod error;

pub use config::{ConnectionInfo, ConnectionInfoBuilder};
pub use error::{Error, Result};

/// Connector version, sent nowhere on the wire but useful for diagnostics
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
