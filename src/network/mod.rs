//! Network layer for har-replay
//!
//! Async HTTP front end that feeds live requests into the replay engine.

mod server;

pub use server::ReplayServer;

/// Graceful shutdown timeout
pub const SHUTDOWN_TIMEOUT_MS: u64 = 5000;
