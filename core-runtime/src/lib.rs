//! # Core Runtime Module
//!
//! Provides the runtime infrastructure shared by the decoding crates:
//! - Logging and tracing infrastructure
//! - Runtime error types
//!
//! ## Overview
//!
//! Library crates in this workspace only emit `tracing` events. This crate
//! owns the subscriber side: hosts call [`logging::init_logging`] once at
//! startup.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
