//! Event type definitions for result delivery and scan progress.

use crate::core::barcode::DetectionPayload;
use serde::Serialize;

/// All events emitted by the scanning core
#[derive(Debug, Clone, Serialize)]
pub enum Event {
    /// Live frame analysis events
    Live(LiveEvent),
    /// Static image scan events
    Static(StaticScanEvent),
}

/// Events from a live analysis session
#[derive(Debug, Clone, Serialize)]
pub enum LiveEvent {
    /// Analysis started, results will be emitted
    Started,
    /// Analysis stopped, frames are dropped without recognition
    Stopped,
    /// Emission suppressed; frames are still gated and recognized
    Paused,
    /// Emission re-enabled
    Resumed,
    /// One detected barcode. A frame with several codes emits one event
    /// per code, in recognizer order.
    BarcodeScanned(DetectionPayload),
}

/// Events while scanning a static image through the resolution cascade
#[derive(Debug, Clone, Serialize)]
pub enum StaticScanEvent {
    /// Image decoded and oriented, cascade about to run
    Started {
        source: String,
        width: u32,
        height: u32,
    },
    /// A cascade step is being attempted
    StepAttempted {
        ordinal: usize,
        /// Target longest side, None for the original size
        target: Option<u32>,
    },
    /// The recognizer failed on a step; the cascade moves on
    StepFailed {
        ordinal: usize,
        message: String,
        transient: bool,
    },
    /// Cascade finished
    Completed {
        /// Number of barcodes found (0 when every step missed)
        found: usize,
        /// Number of recognizer invocations
        attempts: usize,
    },
}
