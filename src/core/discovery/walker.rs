//! Directory walking implementation using walkdir.

use super::filter::ImageFilter;
use super::DiscoveryResult;
use crate::error::ImageError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for image discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

/// Expands files and directories into a flat list of image paths
pub struct WalkDirDiscovery {
    config: DiscoveryConfig,
    filter: ImageFilter,
}

impl WalkDirDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);
        if let Some(extensions) = &config.extensions {
            filter = filter.with_extensions(extensions);
        }
        Self { config, filter }
    }

    /// Collect images under every input path.
    ///
    /// Explicit file arguments are kept even when their extension is not
    /// recognized; the decoder decides. Problems are collected, not fatal.
    pub fn discover(&self, inputs: &[PathBuf]) -> DiscoveryResult {
        let mut result = DiscoveryResult::default();

        for input in inputs {
            if input.is_file() {
                result.images.push(input.clone());
            } else if input.is_dir() {
                self.walk(input, &mut result);
            } else {
                result
                    .errors
                    .push(ImageError::NotFound { path: input.clone() });
            }
        }

        debug!(
            images = result.images.len(),
            errors = result.errors.len(),
            "discovery finished"
        );
        result
    }

    fn walk(&self, root: &Path, result: &mut DiscoveryResult) {
        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let entries = walker
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.filter.is_hidden(entry.path()));

        for entry in entries {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if self.filter.should_include(entry.path()) {
                        result.images.push(entry.into_path());
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop"));
                    result.errors.push(ImageError::Io { path, source });
                }
            }
        }
    }
}
