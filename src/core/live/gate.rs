//! Single-flight, debounced admission of live frames.

use super::clock::Clock;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Default minimum spacing between two successful recognitions
pub const DEFAULT_SCAN_DELAY: Duration = Duration::from_millis(500);

/// Why a frame was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// Another frame is being recognized
    Busy,
    /// Inside the debounce window after a successful recognition
    Debounced,
    /// Analysis is not running
    Stopped,
}

/// Where the gate is in its cycle. Exactly one flight can exist because
/// admission is only possible from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    /// Ready for a frame, possibly inside a debounce window
    Idle { last_accepted_at: Option<Instant> },
    /// One admitted frame is being recognized
    InFlight {
        admitted_at: Instant,
        last_accepted_at: Option<Instant>,
    },
}

impl GateState {
    fn last_accepted_at(&self) -> Option<Instant> {
        match *self {
            GateState::Idle { last_accepted_at } | GateState::InFlight { last_accepted_at, .. } => {
                last_accepted_at
            }
        }
    }
}

#[derive(Debug)]
struct GateCell {
    state: GateState,
    /// Bumped by `reset` so a flight admitted before the reset cannot
    /// touch the new session
    epoch: u64,
}

/// Result of offering a frame to the gate
#[derive(Debug)]
pub enum Admission<'g> {
    /// Run recognition, then finish the flight
    Admitted(InFlight<'g>),
    Dropped(DropReason),
}

/// Gatekeeper for recognizer invocations.
///
/// At most one admitted frame is in flight at any time. There is no queue:
/// frames offered while busy are dropped, so the newest frame after the
/// flight finishes wins. After a recognition that found something, frames
/// are dropped until the scan delay has elapsed since that frame's
/// admission. Misses and failures do not start the window.
pub struct FrameGate {
    scan_delay: Duration,
    clock: Arc<dyn Clock>,
    cell: Mutex<GateCell>,
}

impl FrameGate {
    pub fn new(scan_delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            scan_delay,
            clock,
            cell: Mutex::new(GateCell {
                state: GateState::Idle {
                    last_accepted_at: None,
                },
                epoch: 0,
            }),
        }
    }

    pub fn scan_delay(&self) -> Duration {
        self.scan_delay
    }

    /// Check and claim the gate atomically
    pub fn submit(&self) -> Admission<'_> {
        let mut cell = self.lock();

        let last_accepted_at = match cell.state {
            GateState::InFlight { .. } => return Admission::Dropped(DropReason::Busy),
            GateState::Idle { last_accepted_at } => last_accepted_at,
        };

        let now = self.clock.now();
        if let Some(last) = last_accepted_at {
            if now.saturating_duration_since(last) < self.scan_delay {
                return Admission::Dropped(DropReason::Debounced);
            }
        }

        cell.state = GateState::InFlight {
            admitted_at: now,
            last_accepted_at,
        };
        Admission::Admitted(InFlight {
            gate: self,
            admitted_at: now,
            epoch: cell.epoch,
            finished: false,
        })
    }

    /// Forget the debounce window, as on a fresh session.
    ///
    /// A flight already in progress keeps the gate busy until it finishes.
    pub fn reset(&self) {
        let mut cell = self.lock();
        cell.state = match cell.state {
            GateState::Idle { .. } => GateState::Idle {
                last_accepted_at: None,
            },
            GateState::InFlight { admitted_at, .. } => GateState::InFlight {
                admitted_at,
                last_accepted_at: None,
            },
        };
        cell.epoch = cell.epoch.wrapping_add(1);
    }

    /// Whether a recognition is currently in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.lock().state, GateState::InFlight { .. })
    }

    /// Admission time of the last successful recognition
    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.lock().state.last_accepted_at()
    }

    /// Return to `Idle`. Reports whether the flight still belongs to the
    /// current session.
    fn finish(&self, epoch: u64, found: bool) -> bool {
        let mut cell = self.lock();
        let current = cell.epoch == epoch;

        let state = cell.state;
        match state {
            GateState::InFlight {
                admitted_at,
                last_accepted_at,
            } => {
                let last_accepted_at = if found && current {
                    Some(admitted_at)
                } else {
                    last_accepted_at
                };
                cell.state = GateState::Idle { last_accepted_at };
                trace!(found, current, "gate released");
            }
            GateState::Idle { .. } => {
                warn!("gate released while idle");
            }
        }

        current
    }

    fn lock(&self) -> MutexGuard<'_, GateCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An admitted frame's claim on the gate.
///
/// Dropping it releases the gate, so the release also happens when
/// recognition returns early or panics. Only [`InFlight::complete`] with
/// `found = true` starts the debounce window.
#[derive(Debug)]
pub struct InFlight<'g> {
    gate: &'g FrameGate,
    admitted_at: Instant,
    epoch: u64,
    finished: bool,
}

impl InFlight<'_> {
    /// Finish the flight, recording whether anything was detected.
    ///
    /// Returns false when the gate was reset while this flight ran; its
    /// results belong to a session that has ended.
    pub fn complete(mut self, found: bool) -> bool {
        self.finished = true;
        self.gate.finish(self.epoch, found)
    }

    pub fn admitted_at(&self) -> Instant {
        self.admitted_at
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.gate.finish(self.epoch, false);
        }
    }
}

impl std::fmt::Debug for FrameGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameGate")
            .field("scan_delay", &self.scan_delay)
            .field("state", &*self.lock())
            .finish()
    }
}
