//! # Recognizer Module
//!
//! The optical recognition capability consumed by the scanning core.
//!
//! The core never decodes bit patterns itself. It hands pixels plus a
//! rotation hint to a [`Recognizer`] and receives zero or more
//! [`RawDetection`]s back. Platform adapters (native vision APIs behind FFI,
//! or the bundled [`QrRecognizer`]) implement the trait; everything else in
//! the crate is recognizer-agnostic.

mod qr;

pub use qr::QrRecognizer;

use crate::core::barcode::RawDetection;
use crate::core::format::BarcodeFormat;
use crate::error::RecognizeError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Clockwise rotation needed to bring pixels upright
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Parse a rotation in degrees. Accepts any multiple of 90, including negatives.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotate an image clockwise by this amount, borrowing when no work is needed
    pub fn apply(self, image: &DynamicImage) -> std::borrow::Cow<'_, DynamicImage> {
        use std::borrow::Cow;
        match self {
            Rotation::Deg0 => Cow::Borrowed(image),
            Rotation::Deg90 => Cow::Owned(image.rotate90()),
            Rotation::Deg180 => Cow::Owned(image.rotate180()),
            Rotation::Deg270 => Cow::Owned(image.rotate270()),
        }
    }
}

/// Trait for optical recognizers.
///
/// Implementations must return an empty list, not an error, when no codes
/// are found. Errors are reserved for buffers the recognizer cannot process
/// or internal failures.
pub trait Recognizer: Send + Sync {
    /// Detect codes in `image`, whose content is rotated by `rotation`.
    ///
    /// `formats` restricts the symbologies to look for; an empty set means
    /// the recognizer's default (all supported formats).
    fn recognize(
        &self,
        image: &DynamicImage,
        rotation: Rotation,
        formats: BarcodeFormat,
    ) -> Result<Vec<RawDetection>, RecognizeError>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "recognizer"
    }
}

impl<R: Recognizer + ?Sized> Recognizer for Arc<R> {
    fn recognize(
        &self,
        image: &DynamicImage,
        rotation: Rotation,
        formats: BarcodeFormat,
    ) -> Result<Vec<RawDetection>, RecognizeError> {
        (**self).recognize(image, rotation, formats)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<R: Recognizer + ?Sized> Recognizer for Box<R> {
    fn recognize(
        &self,
        image: &DynamicImage,
        rotation: Rotation,
        formats: BarcodeFormat,
    ) -> Result<Vec<RawDetection>, RecognizeError> {
        (**self).recognize(image, rotation, formats)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<R: Recognizer + ?Sized> Recognizer for &R {
    fn recognize(
        &self,
        image: &DynamicImage,
        rotation: Rotation,
        formats: BarcodeFormat,
    ) -> Result<Vec<RawDetection>, RecognizeError> {
        (**self).recognize(image, rotation, formats)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
