//! Wire messages exchanged with the remote authority.
//!
//! Outbound `TriggerRequest`:
//!
//! ```json
//! { "step": 3, "data": { "device_id": "...", "identity": "10.20.30",
//!                        "failed": 0, "success": 1 } }
//! ```
//!
//! `failed`/`success` are present only on `Revend` status triggers.
//!
//! Inbound `ActionResponse`:
//!
//! ```json
//! { "step": 2, "data": { "state": 2, "link": "https://..." } }
//! ```

use serde::{Deserialize, Serialize};

use crate::fsm::{RegistrationState, Step};

// ---------------------------------------------------------------------------
// Step as it appears on the wire
// ---------------------------------------------------------------------------

/// A step that can be sent in a trigger. `Idle` has no wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum WireStep {
    Cancel,
    Auth,
    Revend,
}

impl WireStep {
    pub const fn step(self) -> Step {
        match self {
            Self::Cancel => Step::Cancel,
            Self::Auth => Step::Auth,
            Self::Revend => Step::Revend,
        }
    }
}

impl From<WireStep> for u8 {
    fn from(s: WireStep) -> u8 {
        match s {
            WireStep::Cancel => 1,
            WireStep::Auth => 2,
            WireStep::Revend => 3,
        }
    }
}

impl TryFrom<u8> for WireStep {
    type Error = UnknownStep;

    fn try_from(code: u8) -> Result<Self, UnknownStep> {
        match Step::from_wire(u64::from(code)) {
            Some(Step::Cancel) => Ok(Self::Cancel),
            Some(Step::Auth) => Ok(Self::Auth),
            Some(Step::Revend) => Ok(Self::Revend),
            _ => Err(UnknownStep(code)),
        }
    }
}

/// A step code outside `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownStep(pub u8);

impl core::fmt::Display for UnknownStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown step code {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Outbound trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerData {
    pub device_id: String,
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub step: WireStep,
    pub data: TriggerData,
}

impl TriggerRequest {
    fn new(step: WireStep, device_id: &str, identity: &str) -> Self {
        Self {
            step,
            data: TriggerData {
                device_id: device_id.to_owned(),
                identity: identity.to_owned(),
                failed: None,
                success: None,
            },
        }
    }

    /// The holder abandoned the session.
    pub fn cancel(device_id: &str, identity: &str) -> Self {
        Self::new(WireStep::Cancel, device_id, identity)
    }

    /// A new tag asks to be authenticated.
    pub fn auth(device_id: &str, identity: &str) -> Self {
        Self::new(WireStep::Auth, device_id, identity)
    }

    /// Running tallies after a classifier commit.
    pub fn status(device_id: &str, identity: &str, failed: u32, success: u32) -> Self {
        let mut req = Self::new(WireStep::Revend, device_id, identity);
        req.data.failed = Some(failed);
        req.data.success = Some(success);
        req
    }
}

// ---------------------------------------------------------------------------
// Inbound action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionData {
    pub state: RegistrationState,
    pub link: String,
}

/// A decoded action. `step` is `None` when the code was missing or unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResponse {
    pub step: Option<Step>,
    pub data: ActionData,
}

impl ActionResponse {
    pub fn cancel() -> Self {
        Self {
            step: Some(Step::Cancel),
            data: ActionData::default(),
        }
    }

    pub fn auth(state: RegistrationState, link: &str) -> Self {
        Self {
            step: Some(Step::Auth),
            data: ActionData {
                state,
                link: link.to_owned(),
            },
        }
    }
}
