//! Boomerang Core - processing backend for the boomerang recorder
//!
//! Turns a short clip into the clip followed by its reverse, using
//! ffmpeg/ffprobe. This crate has no UI dependencies; the `boomerang`
//! binary and any capture front end sit on top of it.

pub mod capture;
pub mod config;
pub mod gallery;
pub mod logging;
pub mod orchestrator;
pub mod service;
pub mod toolchain;
pub mod workspace;

pub use service::{produce_boomerang, Boomerang, BoomerangOutput};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
