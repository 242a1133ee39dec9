//! Radar Core - lossless audio retiming for Dragon Radar
//!
//! Re-aligns a compressed audio track from one video edition to another
//! edition's scene boundaries, without re-encoding. This crate holds all of
//! the logic; the `dragon-radar` binary is a thin command line front end.

pub mod batch;
pub mod config;
pub mod logging;
pub mod models;
pub mod retime;
pub mod series;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
