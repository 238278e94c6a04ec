//! # Core Module
//!
//! The platform-agnostic scanning engine.
//!
//! ## Modules
//! - `format` - Canonical barcode format flags and recognizer symbologies
//! - `classifier` - Semantic typing of decoded payload text
//! - `barcode` - Detection records and the event payload shape
//! - `recognizer` - The recognition capability, plus a QR implementation
//! - `orientation` - EXIF orientation correction
//! - `imaging` - Image loading, decoding and resizing
//! - `cascade` - Multi-scale recognition of still images
//! - `pipeline` - Still image scans end to end
//! - `live` - Gated, debounced analysis of camera frames
//! - `discovery` - Finds image files in directories

pub mod barcode;
pub mod cascade;
pub mod classifier;
pub mod discovery;
pub mod format;
pub mod imaging;
pub mod live;
pub mod orientation;
pub mod pipeline;
pub mod recognizer;

// Re-export commonly used types
pub use barcode::{ClassifiedBarcode, CoordinateSpace, DetectionPayload, ImageSize, RawDetection};
pub use classifier::{classify, ValueType};
pub use format::{BarcodeFormat, Symbology};
pub use imaging::ImageSource;
pub use live::{Frame, FrameOutcome, LiveAnalyzer};
pub use pipeline::StaticScanner;
pub use recognizer::{QrRecognizer, Recognizer, Rotation};
