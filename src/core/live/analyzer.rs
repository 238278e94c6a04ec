//! Live analysis session: gate, recognize, classify, emit.

use super::clock::{Clock, SystemClock};
use super::frame::Frame;
use super::gate::{Admission, DropReason, FrameGate, DEFAULT_SCAN_DELAY};
use crate::core::barcode::{ClassifiedBarcode, CoordinateSpace};
use crate::core::format::BarcodeFormat;
use crate::core::recognizer::Recognizer;
use crate::error::RecognizeError;
use crate::events::{null_sender, Event, EventSender, LiveEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Configuration for live analysis
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Minimum time between two successful recognitions
    pub scan_delay: Duration,
    /// Formats to look for; empty means all
    pub formats: BarcodeFormat,
    /// Pause emission after the first batch of results
    pub auto_pause_after_scan: bool,
    /// Geometry units for emitted detections
    pub coordinate_space: CoordinateSpace,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            scan_delay: DEFAULT_SCAN_DELAY,
            formats: BarcodeFormat::ALL,
            auto_pause_after_scan: false,
            coordinate_space: CoordinateSpace::Pixel,
        }
    }
}

/// What happened to one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Released without recognition
    Dropped(DropReason),
    /// Recognized, nothing found
    Missed,
    /// The recognizer failed; treated as a miss by the gate
    Failed(RecognizeError),
    /// Recognized with this many detections
    Detected { count: usize },
}

/// Builder for [`LiveAnalyzer`]
pub struct LiveAnalyzerBuilder<R> {
    recognizer: R,
    config: LiveConfig,
    clock: Option<Arc<dyn Clock>>,
    events: Option<EventSender>,
}

impl<R: Recognizer> LiveAnalyzerBuilder<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            config: LiveConfig::default(),
            clock: None,
            events: None,
        }
    }

    /// Set the debounce window
    pub fn scan_delay(mut self, delay: Duration) -> Self {
        self.config.scan_delay = delay;
        self
    }

    /// Restrict recognition to these formats
    pub fn formats(mut self, formats: BarcodeFormat) -> Self {
        self.config.formats = formats;
        self
    }

    pub fn auto_pause_after_scan(mut self, enabled: bool) -> Self {
        self.config.auto_pause_after_scan = enabled;
        self
    }

    pub fn coordinate_space(mut self, space: CoordinateSpace) -> Self {
        self.config.coordinate_space = space;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: LiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom time source
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Deliver events to this sender
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Build a stopped analyzer
    pub fn build(self) -> LiveAnalyzer<R> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        LiveAnalyzer {
            recognizer: self.recognizer,
            gate: FrameGate::new(self.config.scan_delay, clock),
            config: self.config,
            events: self.events.unwrap_or_else(null_sender),
            running: AtomicBool::new(false),
            emitting: AtomicBool::new(false),
        }
    }
}

/// A live camera analysis session.
///
/// Frame producers call [`analyze`](Self::analyze) from any thread; the
/// gate serializes recognitions. Detections go out as
/// [`LiveEvent::BarcodeScanned`], one event per code, to the receiver held
/// by the delivery context.
pub struct LiveAnalyzer<R> {
    recognizer: R,
    config: LiveConfig,
    gate: FrameGate,
    events: EventSender,
    running: AtomicBool,
    emitting: AtomicBool,
}

impl<R: Recognizer> LiveAnalyzer<R> {
    pub fn builder(recognizer: R) -> LiveAnalyzerBuilder<R> {
        LiveAnalyzerBuilder::new(recognizer)
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Begin accepting frames and emitting results
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.emitting.store(true, Ordering::SeqCst);
        debug!("live analysis started");
        self.events.send(Event::Live(LiveEvent::Started));
    }

    /// Stop accepting frames and reset the gate
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.emitting.store(false, Ordering::SeqCst);
        self.gate.reset();
        debug!("live analysis stopped");
        self.events.send(Event::Live(LiveEvent::Stopped));
    }

    /// Suppress emission. Frames are still gated and recognized.
    pub fn pause(&self) {
        self.emitting.store(false, Ordering::SeqCst);
        self.events.send(Event::Live(LiveEvent::Paused));
    }

    /// Re-enable emission
    pub fn resume(&self) {
        self.emitting.store(true, Ordering::SeqCst);
        self.events.send(Event::Live(LiveEvent::Resumed));
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.is_running() && !self.emitting.load(Ordering::SeqCst)
    }

    /// Offer one frame. The frame is released before this returns,
    /// whatever the outcome.
    pub fn analyze(&self, frame: Frame) -> FrameOutcome {
        if !self.is_running() {
            trace!("frame dropped, analysis stopped");
            return FrameOutcome::Dropped(DropReason::Stopped);
        }

        let flight = match self.gate.submit() {
            Admission::Admitted(flight) => flight,
            Admission::Dropped(reason) => {
                trace!(?reason, "frame dropped");
                return FrameOutcome::Dropped(reason);
            }
        };

        let (width, height) = frame.upright_dimensions();
        let result = self
            .recognizer
            .recognize(frame.image(), frame.rotation(), self.config.formats);
        drop(frame);

        match result {
            Ok(detections) if !detections.is_empty() => {
                let current = flight.complete(true);
                let barcodes: Vec<ClassifiedBarcode> = detections
                    .into_iter()
                    .map(|d| d.in_space(self.config.coordinate_space, width, height))
                    .map(|d| ClassifiedBarcode::from_raw(d).with_image_size(width, height))
                    .collect();
                let count = barcodes.len();
                if current {
                    debug!(count, "live frame detected codes");
                    self.emit(&barcodes);
                } else {
                    debug!(count, "session restarted during recognition, results discarded");
                }
                FrameOutcome::Detected { count }
            }
            Ok(_) => {
                flight.complete(false);
                FrameOutcome::Missed
            }
            Err(e) => {
                flight.complete(false);
                warn!(
                    error = %e,
                    transient = e.is_transient(),
                    recognizer = self.recognizer.name(),
                    "live recognition failed"
                );
                FrameOutcome::Failed(e)
            }
        }
    }

    fn emit(&self, barcodes: &[ClassifiedBarcode]) {
        if !self.emitting.load(Ordering::SeqCst) {
            trace!(count = barcodes.len(), "emission paused, results discarded");
            return;
        }

        for barcode in barcodes {
            self.events
                .send(Event::Live(LiveEvent::BarcodeScanned(barcode.to_payload())));
        }

        if self.config.auto_pause_after_scan {
            self.pause();
        }
    }
}
