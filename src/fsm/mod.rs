//! Session state model.
//!
//! The session moves through four coarse steps. While in `Auth`, the
//! registration state received from the remote authority decides what
//! happens next:
//!
//! ```text
//!  IDLE ──[tag scanned]──▶ IDLE (auth trigger sent, awaiting action)
//!    │
//!    └─[action Auth]──▶ AUTH ──[AlreadyRegistered | SuccessRegistered]──▶ REVEND
//!                        │                                                  │
//!                        └──[MustRegister]── QR shown, waits                │
//!                                                                           │
//!  any ──[cancel button | action Cancel]──▶ CANCEL ◀────────────────────────┘
//! ```
//!
//! The controller dispatches on `(Step, RegistrationState)` through
//! [`Phase::of`], an exhaustive match, so adding a variant to either enum
//! forces every combination to be handled.

pub mod session;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// Coarse session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    #[default]
    Idle,
    Cancel,
    Auth,
    Revend,
}

impl Step {
    /// Decode a protocol step code. Unknown codes map to `None`.
    pub const fn from_wire(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Cancel),
            2 => Some(Self::Auth),
            3 => Some(Self::Revend),
            _ => None,
        }
    }

    /// Steps in which no session is running and a tag may be scanned.
    pub const fn is_resting(self) -> bool {
        matches!(self, Self::Idle | Self::Cancel)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Cancel => "Cancel",
            Self::Auth => "Auth",
            Self::Revend => "Revend",
        }
    }
}

// ---------------------------------------------------------------------------
// Registration state
// ---------------------------------------------------------------------------

/// Registration outcome reported by the remote authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum RegistrationState {
    #[default]
    None = 0,
    AlreadyRegistered = 1,
    MustRegister = 2,
    SuccessRegistered = 3,
}

impl RegistrationState {
    /// Decode a protocol state code. Unknown codes fall back to `None`.
    pub const fn from_wire(code: u64) -> Self {
        match code {
            1 => Self::AlreadyRegistered,
            2 => Self::MustRegister,
            3 => Self::SuccessRegistered,
            _ => Self::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase dispatch
// ---------------------------------------------------------------------------

/// What the controller should do on a phase tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session: the loop polls the tag reader.
    Resting,
    /// Registered identity: move to item acceptance.
    EnterRevend,
    /// Unregistered identity: show the registration link.
    ShowRegistration,
    /// Auth step with no usable state.
    AwaitingState,
    /// Accepting items: run the debounce tick.
    Accepting,
}

impl Phase {
    pub const fn of(step: Step, state: RegistrationState) -> Self {
        match (step, state) {
            (Step::Idle | Step::Cancel, _) => Self::Resting,
            (Step::Auth, RegistrationState::AlreadyRegistered)
            | (Step::Auth, RegistrationState::SuccessRegistered) => Self::EnterRevend,
            (Step::Auth, RegistrationState::MustRegister) => Self::ShowRegistration,
            (Step::Auth, RegistrationState::None) => Self::AwaitingState,
            (Step::Revend, _) => Self::Accepting,
        }
    }
}
