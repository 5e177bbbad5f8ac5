//! The session record owned by the controller.
//!
//! `Session` is the single struct the controller reads from and writes to:
//! current step and registration state, the scanned identity, the
//! registration link, per-session tallies, and the classifier's debounce
//! state. Reset rules are explicit methods so the invariants live in one
//! place:
//!
//! - no identity ⇒ step is `Idle` or `Cancel`
//! - tallies reset only on [`Session::begin`] and [`Session::clear`]

use super::{RegistrationState, Step};
use crate::sensors::classifier::Debounce;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub step: Step,
    pub state: RegistrationState,
    /// Dotted-decimal tag UID; empty when no session is active.
    pub identity: String,
    /// Registration URL for an unregistered identity.
    pub registration_link: String,
    pub points_accepted: u32,
    pub points_rejected: u32,
    pub debounce: Debounce,
}

impl Session {
    /// Boot-time session: `Idle`, no identity, zero tallies.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        !self.identity.is_empty()
    }

    /// Start a session for a freshly scanned tag.
    pub fn begin(&mut self, identity: &str) {
        self.state = RegistrationState::None;
        self.identity.clear();
        self.identity.push_str(identity);
        self.points_accepted = 0;
        self.points_rejected = 0;
        self.registration_link.clear();
        self.debounce.reset();
    }

    /// Drop the session and park in `Cancel`.
    pub fn clear(&mut self) {
        self.step = Step::Cancel;
        self.state = RegistrationState::None;
        self.identity.clear();
        self.registration_link.clear();
        self.points_accepted = 0;
        self.points_rejected = 0;
        self.debounce.reset();
    }

    /// Apply an `Auth` action from the remote authority.
    ///
    /// The link is kept only for `MustRegister`. A new state releases the
    /// latch so its entry branch runs once; a repeat of the current state
    /// leaves the debounce state alone, so an item already scored stays
    /// latched.
    pub fn enter_auth(&mut self, state: RegistrationState, link: &str) {
        let repeated = state == self.state;
        self.step = Step::Auth;
        self.state = state;
        self.registration_link.clear();
        if state == RegistrationState::MustRegister {
            self.registration_link.push_str(link);
        }
        if !repeated {
            self.debounce.reset();
        }
    }
}
