//! # Barcode Module
//!
//! Detection records as they flow out of a recognizer and into callers.
//!
//! - [`RawDetection`] - what a recognizer reports, in its own vocabulary
//! - [`ClassifiedBarcode`] - a raw detection plus canonical format and value type
//! - [`DetectionPayload`] - the serialized event shape shared with host platforms
//! - [`ImageSize`] - the upright image dimensions pixel geometry refers to

use crate::core::classifier::{classify, ValueType};
use crate::core::format::{BarcodeFormat, Symbology};
use serde::{Deserialize, Serialize};

/// A 2D point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    /// Smallest rectangle containing every point, or None for no points
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            left: first.x,
            top: first.y,
            right: first.x,
            bottom: first.y,
        };
        for point in &points[1..] {
            bounds.left = bounds.left.min(point.x);
            bounds.top = bounds.top.min(point.y);
            bounds.right = bounds.right.max(point.x);
            bounds.bottom = bounds.bottom.max(point.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Dimensions of the image that pixel geometry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Coordinate system used for emitted geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Pixels of the (orientation-corrected, unscaled) source image
    #[default]
    Pixel,
    /// Fractions of the source image width and height, in `[0, 1]`
    Normalized,
}

/// A detection as reported by a recognizer
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Recognizer-native symbology
    pub symbology: Symbology,
    /// Decoded text. None means a structurally valid but unreadable code.
    pub raw_value: Option<String>,
    /// Corner points in recognizer order
    pub corner_points: Option<Vec<Point>>,
    pub bounding_box: Option<BoundingBox>,
}

impl RawDetection {
    /// A detection with decoded text and no geometry
    pub fn new(symbology: Symbology, raw_value: impl Into<String>) -> Self {
        Self {
            symbology,
            raw_value: Some(raw_value.into()),
            corner_points: None,
            bounding_box: None,
        }
    }

    pub fn with_corners(mut self, corners: Vec<Point>) -> Self {
        self.corner_points = Some(corners);
        self
    }

    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    /// Multiply all geometry by per-axis factors
    pub fn scaled(mut self, sx: f64, sy: f64) -> Self {
        if let Some(points) = self.corner_points.as_mut() {
            for point in points.iter_mut() {
                point.x *= sx;
                point.y *= sy;
            }
        }
        if let Some(rect) = self.bounding_box.as_mut() {
            rect.left *= sx;
            rect.right *= sx;
            rect.top *= sy;
            rect.bottom *= sy;
        }
        self
    }

    /// Convert pixel geometry for an image of `width` x `height` into `space`
    pub fn in_space(self, space: CoordinateSpace, width: u32, height: u32) -> Self {
        match space {
            CoordinateSpace::Pixel => self,
            CoordinateSpace::Normalized if width > 0 && height > 0 => {
                self.scaled(1.0 / f64::from(width), 1.0 / f64::from(height))
            }
            CoordinateSpace::Normalized => self,
        }
    }
}

/// A detection with its canonical format and semantic value type.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedBarcode {
    detection: RawDetection,
    format: BarcodeFormat,
    value_type: ValueType,
    image_size: Option<ImageSize>,
}

impl ClassifiedBarcode {
    /// Canonicalize and classify a raw detection
    pub fn from_raw(detection: RawDetection) -> Self {
        let format = detection.symbology.to_canonical();
        let value_type = classify(detection.raw_value.as_deref());
        Self {
            detection,
            format,
            value_type,
            image_size: None,
        }
    }

    /// Record the size of the upright image the detection was found in
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = Some(ImageSize::new(width, height));
        self
    }

    pub fn detection(&self) -> &RawDetection {
        &self.detection
    }

    pub fn raw_value(&self) -> Option<&str> {
        self.detection.raw_value.as_deref()
    }

    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.image_size
    }

    /// Build the serialized event payload
    pub fn to_payload(&self) -> DetectionPayload {
        DetectionPayload {
            raw_value: self.detection.raw_value.clone(),
            format: self.format,
            corner_points: self.detection.corner_points.clone(),
            bounding_box: self.detection.bounding_box,
            value_type: self.value_type.clone(),
            image_size: self.image_size,
        }
    }
}

/// Detection event payload shared with host platforms.
///
/// Field names are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionPayload {
    pub raw_value: Option<String>,
    pub format: BarcodeFormat,
    pub corner_points: Option<Vec<Point>>,
    pub bounding_box: Option<BoundingBox>,
    pub value_type: ValueType,
    /// Upright source dimensions, for interpreting pixel geometry
    pub image_size: Option<ImageSize>,
}
