//! # Error Module
//!
//! Error types for the scanning core.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, dimensions, what went wrong
//! - **Only input errors cross the boundary** - recognition misses and
//!   transform failures are absorbed inside the core

use std::path::PathBuf;
use thiserror::Error;

/// Top-level library error
#[derive(Error, Debug)]
pub enum LumiscanError {
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors caused by the caller's input (unreadable or missing images)
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("No image was provided: a path or non-empty bytes are required")]
    MissingInput,

    #[error("Image not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {reason}")]
    Decode { reason: String },

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Errors reported by a recognizer implementation.
///
/// "No codes found" is never an error: recognizers return an empty list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognizeError {
    #[error("Recognizer rejected the input buffer: {reason}")]
    MalformedInput { reason: String },

    #[error("Recognizer failed: {reason}")]
    Engine { reason: String },

    #[error("Recognizer temporarily unavailable: {reason}")]
    Unavailable { reason: String },
}

impl RecognizeError {
    /// Whether retrying the same input later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, RecognizeError::Unavailable { .. })
    }
}

/// Errors from orientation or scaling transforms.
///
/// These never escape the core: callers fall back to the untransformed buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Cannot transform an empty buffer")]
    EmptyBuffer,

    #[error("Resize to {width}x{height} failed: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, LumiscanError>;
