//! # Pipeline Module
//!
//! Orchestrates a still image scan.
//!
//! ## Pipeline Stages
//! 1. **Load** - Read bytes or a file and decode pixels
//! 2. **Orient** - Apply the EXIF orientation tag (fail soft)
//! 3. **Cascade** - Recognize at each ladder scale until something is found
//! 4. **Classify** - Canonical format and semantic value type per detection
//!
//! Only stage 1 can fail. Every later problem degrades to "no result".

mod executor;

pub use executor::{StaticScanConfig, StaticScanner, StaticScannerBuilder};
