//! Deadline timer against an injected monotonic clock.
//!
//! A `Deadline` is either stopped or due at an absolute millisecond value.
//! `just_finished` reports expiry exactly once; `repeat` re-arms from the
//! previous due time so a periodic timer does not drift with loop jitter.
//! After a stall longer than one period the timer re-arms from `now`
//! instead of firing a burst of catch-up ticks.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    period_ms: u64,
    due_at: Option<u64>,
    last_due: u64,
}

impl Deadline {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            due_at: None,
            last_due: 0,
        }
    }

    /// Arm the timer one period from `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.due_at = Some(now_ms + self.period_ms);
    }

    pub fn stop(&mut self) {
        self.due_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.due_at.is_some()
    }

    /// `true` once when the deadline has passed. The timer stops.
    pub fn just_finished(&mut self, now_ms: u64) -> bool {
        match self.due_at {
            Some(due) if now_ms >= due => {
                self.last_due = due;
                self.due_at = None;
                true
            }
            _ => false,
        }
    }

    /// Re-arm one period after the deadline that just finished.
    pub fn repeat(&mut self, now_ms: u64) {
        let next = self.last_due + self.period_ms;
        self.due_at = Some(if next > now_ms { next } else { now_ms + self.period_ms });
    }
}
