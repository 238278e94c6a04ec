//! Reading image bytes from the caller's source.
//!
//! Large files are memory-mapped to avoid copying them through the kernel.

use crate::error::ImageError;
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Minimum file size to use memory-mapped I/O (1MB)
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Where a static image comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Encoded image file on disk
    Path(PathBuf),
    /// Encoded image bytes already in memory
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Short description for logs and events
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Encoded bytes that may be owned, borrowed or memory-mapped
pub enum SourceBytes<'a> {
    Borrowed(&'a [u8]),
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl std::ops::Deref for SourceBytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            SourceBytes::Borrowed(bytes) => bytes,
            SourceBytes::Vec(v) => v,
            SourceBytes::Mmap(m) => m,
        }
    }
}

/// Load the encoded bytes of a source.
///
/// Empty input is a caller error, distinct from an undecodable image.
pub fn read_source(source: &ImageSource) -> Result<SourceBytes<'_>, ImageError> {
    match source {
        ImageSource::Bytes(bytes) if bytes.is_empty() => Err(ImageError::MissingInput),
        ImageSource::Bytes(bytes) => Ok(SourceBytes::Borrowed(bytes)),
        ImageSource::Path(path) if path.as_os_str().is_empty() => Err(ImageError::MissingInput),
        ImageSource::Path(path) => read_file_bytes(path),
    }
}

/// Read file bytes, memory-mapping files of 1MB and above
pub fn read_file_bytes(path: &Path) -> Result<SourceBytes<'static>, ImageError> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;

    if metadata.len() >= MMAP_THRESHOLD {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        // SAFETY: read-only mapping; the bytes are only read while the map is alive.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| io_error(path, e))?;
        Ok(SourceBytes::Mmap(mmap))
    } else {
        let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
        Ok(SourceBytes::Vec(bytes))
    }
}

fn io_error(path: &Path, source: io::Error) -> ImageError {
    if source.kind() == io::ErrorKind::NotFound {
        ImageError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        ImageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
