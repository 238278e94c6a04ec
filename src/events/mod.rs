//! # Events Module
//!
//! Event-driven delivery of detections and scan progress.
//!
//! ## Design
//! Recognition runs off the delivery context. The core emits events through
//! a channel; the thread holding the receiver (UI, main loop, CLI printer)
//! consumes them in emission order.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let analyzer = LiveAnalyzer::builder(QrRecognizer::new()).events(sender).build();
//!
//! // On the delivery thread
//! for event in receiver.iter() {
//!     if let Event::Live(LiveEvent::BarcodeScanned(payload)) = event {
//!         println!("{:?}", payload.raw_value);
//!     }
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
