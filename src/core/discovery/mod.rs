//! # Discovery Module
//!
//! Finds image files to scan.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - GIF (.gif)
//! - WebP (.webp)
//! - BMP (.bmp)
//! - TIFF (.tiff, .tif)
//!
//! ## Example
//! ```rust,ignore
//! let discovery = WalkDirDiscovery::new(DiscoveryConfig::default());
//! let found = discovery.discover(&["/Users/me/scans".into()]);
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{DiscoveryConfig, WalkDirDiscovery};

use crate::error::ImageError;
use std::path::PathBuf;

/// Images found plus problems met along the way
#[derive(Debug, Default)]
pub struct DiscoveryResult {
    /// Paths in walk order
    pub images: Vec<PathBuf>,
    /// Non-fatal errors (missing inputs, unreadable entries)
    pub errors: Vec<ImageError>,
}
