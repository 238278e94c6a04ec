//! QR recognizer backed by the pure Rust `rqrr` crate.

use super::{Recognizer, Rotation};
use crate::core::barcode::{BoundingBox, Point, RawDetection};
use crate::core::format::{BarcodeFormat, Symbology};
use crate::error::RecognizeError;
use image::DynamicImage;
use rqrr::PreparedImage;
use tracing::trace;

/// Detects and decodes QR codes only.
///
/// Grids that are located but fail to decode are still reported, with
/// `raw_value = None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrRecognizer;

impl QrRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Recognizer for QrRecognizer {
    fn recognize(
        &self,
        image: &DynamicImage,
        rotation: Rotation,
        formats: BarcodeFormat,
    ) -> Result<Vec<RawDetection>, RecognizeError> {
        if !formats.effective().contains(BarcodeFormat::QR_CODE) {
            return Ok(Vec::new());
        }

        if image.width() == 0 || image.height() == 0 {
            return Err(RecognizeError::MalformedInput {
                reason: format!("empty buffer {}x{}", image.width(), image.height()),
            });
        }

        let upright = rotation.apply(image);
        let gray = upright.to_luma8();
        let (width, height) = gray.dimensions();

        let mut prepared = PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| gray.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        trace!(grids = grids.len(), width, height, "qr grids located");

        let detections = grids
            .iter()
            .map(|grid| {
                let corners: Vec<Point> = grid
                    .bounds
                    .iter()
                    .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                    .collect();
                let bounding_box = BoundingBox::enclosing(&corners);

                RawDetection {
                    symbology: Symbology::Qr,
                    raw_value: grid.decode().ok().map(|(_, content)| content),
                    corner_points: Some(corners),
                    bounding_box,
                }
            })
            .collect();

        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "rqrr"
    }
}
