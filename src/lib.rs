//! Workspace facade crate.
//!
//! Re-exports the workspace crates (`core-flac`, `core-runtime`) so host
//! applications can depend on `flac-pcm-workspace` alone and toggle the
//! Symphonia decoder through the `decoder-flac` feature.

pub use core_flac as flac;
pub use core_runtime as runtime;
