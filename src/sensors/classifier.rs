//! Debounced item classifier.
//!
//! Turns one `(ir, metal)` reading per debounce tick into a tri-state
//! candidate, and commits a verdict only after the same candidate has held
//! for `threshold + 1` consecutive ticks.
//!
//! ```text
//!   ir < IR_THRESHOLD ? ──no──▶ Empty  (reset counters + latch)
//!          │yes
//!   metal < METAL_THRESHOLD ? ──yes──▶ Accept candidate
//!          │no
//!          ▼
//!       Reject candidate
//! ```
//!
//! The latch is held from a commit until the next Empty tick, so an item
//! lingering in front of the sensors is scored exactly once.

use crate::config::RevendConfig;

/// One raw sample from both analog sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorReading {
    pub ir: u16,
    pub metal: u16,
}

/// Per-tick classification before debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    Empty,
    Accept,
    Reject,
}

/// A committed, debounced classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Outcome of one classifier tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub candidate: Candidate,
    pub commit: Option<Verdict>,
}

/// Persistent debounce state, owned by the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Debounce {
    pub consecutive_accept: u8,
    pub consecutive_reject: u8,
    /// The item currently in the field has already been scored.
    pub latched: bool,
}

impl Debounce {
    /// Clear both counters and the latch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn clear_counters(&mut self) {
        self.consecutive_accept = 0;
        self.consecutive_reject = 0;
    }
}

/// Threshold set for the classifier. Cheap to copy out of the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorClassifier {
    ir_threshold: u16,
    metal_threshold: u16,
    debounce_threshold: u8,
}

impl SensorClassifier {
    pub fn new(ir_threshold: u16, metal_threshold: u16, debounce_threshold: u8) -> Self {
        Self {
            ir_threshold,
            metal_threshold,
            debounce_threshold,
        }
    }

    pub fn from_config(config: &RevendConfig) -> Self {
        Self::new(
            config.ir_threshold,
            config.metal_threshold,
            config.debounce_threshold,
        )
    }

    /// Raw candidate for a single reading, no debouncing.
    pub fn candidate(&self, reading: SensorReading) -> Candidate {
        let has_object = reading.ir < self.ir_threshold;
        let is_metallic = reading.metal < self.metal_threshold;
        match (has_object, is_metallic) {
            (false, _) => Candidate::Empty,
            (true, true) => Candidate::Accept,
            (true, false) => Candidate::Reject,
        }
    }

    /// Run one debounce tick.
    pub fn classify(&self, reading: SensorReading, state: &mut Debounce) -> Classification {
        let candidate = self.candidate(reading);

        let verdict = match candidate {
            Candidate::Empty => {
                state.reset();
                return Classification {
                    candidate,
                    commit: None,
                };
            }
            Candidate::Accept => Verdict::Accept,
            Candidate::Reject => Verdict::Reject,
        };

        if state.latched {
            return Classification {
                candidate,
                commit: None,
            };
        }

        let (counter, other) = match verdict {
            Verdict::Accept => (&mut state.consecutive_accept, &mut state.consecutive_reject),
            Verdict::Reject => (&mut state.consecutive_reject, &mut state.consecutive_accept),
        };
        // A flip between Accept and Reject restarts the run.
        *other = 0;

        if *counter < self.debounce_threshold {
            *counter += 1;
            return Classification {
                candidate,
                commit: None,
            };
        }

        state.clear_counters();
        state.latched = true;
        Classification {
            candidate,
            commit: Some(verdict),
        }
    }
}
