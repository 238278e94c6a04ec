//! # Cascade Module
//!
//! Multi-scale recognition of still images.
//!
//! Recognizers are scale-sensitive: very small or very large inputs lower
//! the detection rate, and no single size works for every code density.
//! The cascade tries a fixed ladder of sizes in order and stops at the
//! first step that yields any detection.
//!
//! ## Ladder
//! | Ordinal | Longest side |
//! |---------|--------------|
//! | 0       | 1920 px      |
//! | 1       | 2560 px      |
//! | 2       | 1280 px      |
//! | 3       | original     |
//!
//! Steps run strictly one after another on the calling thread. At most one
//! scaled copy is alive at a time; a step whose target is already larger
//! than the image reuses the original buffer.

use crate::core::barcode::RawDetection;
use crate::core::format::BarcodeFormat;
use crate::core::imaging::FastResizer;
use crate::core::recognizer::{Recognizer, Rotation};
use crate::events::{Event, EventSender, StaticScanEvent};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, trace, warn};

/// One rung of the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleStep {
    /// Maximum longest side in pixels; None keeps the original size
    pub target: Option<u32>,
    /// Position in the ladder
    pub ordinal: usize,
}

/// Ordered sequence of scale steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleLadder {
    steps: Vec<ScaleStep>,
}

impl ScaleLadder {
    /// Build a ladder from targets in preference order
    pub fn new<I>(targets: I) -> Self
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        let steps = targets
            .into_iter()
            .enumerate()
            .map(|(ordinal, target)| ScaleStep { target, ordinal })
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[ScaleStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Default for ScaleLadder {
    fn default() -> Self {
        Self::new([Some(1920), Some(2560), Some(1280), None])
    }
}

/// Detections from the step that ended the cascade
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeHit {
    /// Geometry is in pixels of the unscaled input image
    pub detections: Vec<RawDetection>,
    /// The step that produced them
    pub step: ScaleStep,
    /// Recognizer invocations, including this one
    pub attempts: usize,
}

/// Runs a recognizer over a [`ScaleLadder`]
pub struct ResolutionCascade<'a, R: Recognizer + ?Sized> {
    recognizer: &'a R,
    ladder: &'a ScaleLadder,
    formats: BarcodeFormat,
}

impl<'a, R: Recognizer + ?Sized> ResolutionCascade<'a, R> {
    pub fn new(recognizer: &'a R, ladder: &'a ScaleLadder, formats: BarcodeFormat) -> Self {
        Self {
            recognizer,
            ladder,
            formats,
        }
    }

    /// Try every step in order, returning the first non-empty result.
    ///
    /// Returns None once the ladder is exhausted. Recognizer errors count as
    /// a miss for their step.
    pub fn run(&self, image: &DynamicImage, events: &EventSender) -> Option<CascadeHit> {
        let mut resizer = FastResizer::new();
        let mut attempts = 0;

        for step in self.ladder.steps() {
            events.send(Event::Static(StaticScanEvent::StepAttempted {
                ordinal: step.ordinal,
                target: step.target,
            }));

            let candidate = scaled_for_step(&mut resizer, image, *step);
            attempts += 1;

            match self
                .recognizer
                .recognize(&candidate, Rotation::Deg0, self.formats)
            {
                Ok(detections) if !detections.is_empty() => {
                    debug!(
                        ordinal = step.ordinal,
                        target = ?step.target,
                        count = detections.len(),
                        recognizer = self.recognizer.name(),
                        "cascade hit"
                    );
                    let sx = f64::from(image.width()) / f64::from(candidate.width());
                    let sy = f64::from(image.height()) / f64::from(candidate.height());
                    let detections = detections
                        .into_iter()
                        .map(|detection| detection.scaled(sx, sy))
                        .collect();
                    return Some(CascadeHit {
                        detections,
                        step: *step,
                        attempts,
                    });
                }
                Ok(_) => {
                    trace!(ordinal = step.ordinal, target = ?step.target, "cascade miss");
                }
                Err(e) => {
                    warn!(
                        ordinal = step.ordinal,
                        target = ?step.target,
                        transient = e.is_transient(),
                        error = %e,
                        "recognizer failed, trying next scale"
                    );
                    events.send(Event::Static(StaticScanEvent::StepFailed {
                        ordinal: step.ordinal,
                        message: e.to_string(),
                        transient: e.is_transient(),
                    }));
                }
            }
            // `candidate` is released here before the next step allocates
        }

        debug!(attempts, "cascade exhausted");
        None
    }
}

/// The buffer to recognize for `step`. Falls back to the original image
/// when scaling fails.
fn scaled_for_step<'a>(
    resizer: &mut FastResizer,
    image: &'a DynamicImage,
    step: ScaleStep,
) -> Cow<'a, DynamicImage> {
    let Some(target) = step.target else {
        return Cow::Borrowed(image);
    };

    match resizer.fit_within(image, target) {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!(
                ordinal = step.ordinal,
                target,
                error = %e,
                "scaling failed, using original buffer"
            );
            Cow::Borrowed(image)
        }
    }
}
