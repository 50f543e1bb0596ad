//! har-replay - Deterministic HTTP replay server for HAR recordings
//!
//! Serves previously captured request/response pairs back to clients in
//! recording order, so code under test runs against stable traffic.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod config;
pub mod error;
pub mod har;
pub mod network;
pub mod replay;

pub use error::{ReplayError, Result};
