//! Static image scan implementation.

use crate::core::barcode::{ClassifiedBarcode, CoordinateSpace};
use crate::core::cascade::{ResolutionCascade, ScaleLadder};
use crate::core::format::BarcodeFormat;
use crate::core::imaging::{load_static_image, ImageSource, StaticImage};
use crate::core::orientation::normalize;
use crate::core::recognizer::Recognizer;
use crate::error::LumiscanError;
use crate::events::{null_sender, Event, EventSender, StaticScanEvent};
use tracing::debug;

/// Configuration for static scans
#[derive(Debug, Clone)]
pub struct StaticScanConfig {
    /// Formats to look for; empty means all
    pub formats: BarcodeFormat,
    /// Scales to try, in order
    pub ladder: ScaleLadder,
    /// Geometry units for returned detections
    pub coordinate_space: CoordinateSpace,
    /// Rotate and mirror according to the EXIF orientation tag
    pub apply_orientation: bool,
}

impl Default for StaticScanConfig {
    fn default() -> Self {
        Self {
            formats: BarcodeFormat::ALL,
            ladder: ScaleLadder::default(),
            coordinate_space: CoordinateSpace::Pixel,
            apply_orientation: true,
        }
    }
}

/// Builder for [`StaticScanner`]
pub struct StaticScannerBuilder<R> {
    recognizer: R,
    config: StaticScanConfig,
}

impl<R: Recognizer> StaticScannerBuilder<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            config: StaticScanConfig::default(),
        }
    }

    /// Restrict recognition to these formats
    pub fn formats(mut self, formats: BarcodeFormat) -> Self {
        self.config.formats = formats;
        self
    }

    /// Replace the scale ladder
    pub fn ladder(mut self, ladder: ScaleLadder) -> Self {
        self.config.ladder = ladder;
        self
    }

    pub fn coordinate_space(mut self, space: CoordinateSpace) -> Self {
        self.config.coordinate_space = space;
        self
    }

    /// Skip orientation correction
    pub fn apply_orientation(mut self, apply: bool) -> Self {
        self.config.apply_orientation = apply;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: StaticScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> StaticScanner<R> {
        StaticScanner {
            recognizer: self.recognizer,
            config: self.config,
        }
    }
}

/// Scans still images: load, orient, cascade, classify.
pub struct StaticScanner<R> {
    recognizer: R,
    config: StaticScanConfig,
}

impl<R: Recognizer> StaticScanner<R> {
    pub fn builder(recognizer: R) -> StaticScannerBuilder<R> {
        StaticScannerBuilder::new(recognizer)
    }

    pub fn config(&self) -> &StaticScanConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Scan an image from bytes or a path.
    ///
    /// `Ok(None)` means every scale was tried without a detection. Input
    /// that cannot be read or decoded is an error, never `Ok(None)`.
    pub fn scan(&self, source: &ImageSource) -> Result<Option<Vec<ClassifiedBarcode>>, LumiscanError> {
        self.scan_with_events(source, &null_sender())
    }

    /// Scan with progress events
    pub fn scan_with_events(
        &self,
        source: &ImageSource,
        events: &EventSender,
    ) -> Result<Option<Vec<ClassifiedBarcode>>, LumiscanError> {
        let loaded = load_static_image(source)?;
        Ok(self.scan_loaded(&source.describe(), loaded, events))
    }

    /// Scan an image that is already decoded
    pub fn scan_image(&self, image: StaticImage) -> Option<Vec<ClassifiedBarcode>> {
        self.scan_loaded("<memory>", image, &null_sender())
    }

    fn scan_loaded(
        &self,
        label: &str,
        loaded: StaticImage,
        events: &EventSender,
    ) -> Option<Vec<ClassifiedBarcode>> {
        let image = if self.config.apply_orientation {
            normalize(loaded.image, loaded.orientation)
        } else {
            loaded.image
        };
        let (width, height) = (image.width(), image.height());

        events.send(Event::Static(StaticScanEvent::Started {
            source: label.to_string(),
            width,
            height,
        }));

        let cascade =
            ResolutionCascade::new(&self.recognizer, &self.config.ladder, self.config.formats);
        let hit = cascade.run(&image, events);

        let (barcodes, attempts) = match hit {
            Some(hit) => {
                let barcodes: Vec<ClassifiedBarcode> = hit
                    .detections
                    .into_iter()
                    .map(|d| d.in_space(self.config.coordinate_space, width, height))
                    .map(|d| ClassifiedBarcode::from_raw(d).with_image_size(width, height))
                    .collect();
                (Some(barcodes), hit.attempts)
            }
            None => (None, self.config.ladder.len()),
        };

        let found = barcodes.as_ref().map_or(0, Vec::len);
        debug!(source = label, found, attempts, "static scan finished");
        events.send(Event::Static(StaticScanEvent::Completed { found, attempts }));

        barcodes
    }
}
