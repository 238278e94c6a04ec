//! # lumiscan
//!
//! A barcode scanning core: classify, gate and scale, while a pluggable
//! recognizer does the optical work.
//!
//! ## Core Philosophy
//! - **Never block the camera** - one recognition in flight, frames beyond that are dropped
//! - **Try harder on stills** - a fixed ladder of scales before giving up
//! - **Fail soft** - transform and recognizer problems degrade to "no result"; only bad input is an error
//!
//! ## Architecture
//! The library is split into a core engine (platform-agnostic) and presentation layers:
//! - `core` - Gate, cascade, orientation, classifier and format codec
//! - `events` - Event-driven result delivery
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{LumiscanError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or host app).
/// Filtering follows `RUST_LOG`. Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
