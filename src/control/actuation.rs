//! Gate actuation coordinator.
//!
//! Two states driven by a dwell deadline:
//!
//! ```text
//!  CLOSED ──[accept commit]──▶ OPEN ──[servo_dwell_ms elapsed]──▶ CLOSED
//! ```
//!
//! Requests that arrive while the gate is open are dropped; there is no
//! queue. Actuation is fire-and-forget, the servo gives no feedback.

use log::debug;

use crate::app::ports::GatePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Closed,
    Open { close_at_ms: u64 },
}

pub struct ActuationCoordinator {
    dwell_ms: u64,
    state: GateState,
}

impl ActuationCoordinator {
    pub fn new(dwell_ms: u64) -> Self {
        Self {
            dwell_ms,
            state: GateState::Closed,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, GateState::Open { .. })
    }

    /// Open the gate unless a cycle is already running.
    /// Returns `true` if the gate was commanded open.
    pub fn request_open(&mut self, now_ms: u64, gate: &mut impl GatePort) -> bool {
        match self.state {
            GateState::Closed => {
                gate.open_gate();
                self.state = GateState::Open {
                    close_at_ms: now_ms + self.dwell_ms,
                };
                true
            }
            GateState::Open { .. } => {
                debug!("Gate: open request ignored, cycle in progress");
                false
            }
        }
    }

    /// Close the gate once the dwell time has elapsed.
    pub fn tick(&mut self, now_ms: u64, gate: &mut impl GatePort) {
        if let GateState::Open { close_at_ms } = self.state {
            if now_ms >= close_at_ms {
                gate.close_gate();
                self.state = GateState::Closed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Servo {
        opens: u32,
        closes: u32,
    }

    impl GatePort for Servo {
        fn open_gate(&mut self) {
            self.opens += 1;
        }
        fn close_gate(&mut self) {
            self.closes += 1;
        }
    }

    #[test]
    fn opens_then_closes_after_dwell() {
        let mut servo = Servo::default();
        let mut gate = ActuationCoordinator::new(400);
        assert!(gate.request_open(1_000, &mut servo));
        assert_eq!(gate.state(), GateState::Open { close_at_ms: 1_400 });
        gate.tick(1_399, &mut servo);
        assert!(gate.is_open());
        gate.tick(1_400, &mut servo);
        assert_eq!(gate.state(), GateState::Closed);
        assert_eq!((servo.opens, servo.closes), (1, 1));
    }

    #[test]
    fn request_while_open_is_ignored() {
        let mut servo = Servo::default();
        let mut gate = ActuationCoordinator::new(400);
        gate.request_open(0, &mut servo);
        assert!(!gate.request_open(100, &mut servo));
        gate.tick(400, &mut servo);
        assert_eq!((servo.opens, servo.closes), (1, 1));
        assert!(gate.request_open(500, &mut servo));
    }

    #[test]
    fn closed_gate_tick_is_noop() {
        let mut servo = Servo::default();
        let mut gate = ActuationCoordinator::new(400);
        gate.tick(10_000, &mut servo);
        assert_eq!(servo.closes, 0);
    }
}
