//! # Live Module
//!
//! Real-time analysis of camera frames.
//!
//! ## Frame Flow
//! 1. **Gate** - drop the frame if a recognition is in flight or the
//!    debounce window is open
//! 2. **Recognize** - run the recognizer once on the admitted frame
//! 3. **Release** - free the gate on every path; only a non-empty result
//!    starts the debounce window
//! 4. **Emit** - classify and send one event per code, unless paused
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let analyzer = LiveAnalyzer::builder(QrRecognizer::new())
//!     .events(sender)
//!     .build();
//! analyzer.start();
//!
//! // Camera callback thread
//! analyzer.analyze(Frame::from_luma8(width, height, plane, Rotation::Deg90)?);
//! ```

mod analyzer;
mod clock;
mod frame;
mod gate;

pub use analyzer::{FrameOutcome, LiveAnalyzer, LiveAnalyzerBuilder, LiveConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use frame::Frame;
pub use gate::{Admission, DropReason, FrameGate, InFlight, DEFAULT_SCAN_DELAY};
