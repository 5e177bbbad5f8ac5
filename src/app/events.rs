//! Outbound application events.
//!
//! The [`SessionController`](super::controller::SessionController) emits
//! these through the [`EventSink`](super::ports::EventSink) port. Adapters
//! on the other side decide what to do with them; on the device they are
//! rendered to the serial log.

use crate::fsm::{RegistrationState, Step};
use crate::protocol::messages::WireStep;
use crate::sensors::classifier::Verdict;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The control loop has started.
    Started,

    /// The session moved between steps.
    StepChanged { from: Step, to: Step },

    /// A new tag opened a session.
    SessionStarted { identity: String },

    /// The remote authority answered an auth trigger.
    AuthResolved { state: RegistrationState },

    /// The classifier committed a verdict; tallies are post-increment.
    ItemScored {
        verdict: Verdict,
        accepted: u32,
        rejected: u32,
    },

    /// A trigger was handed to the messaging gateway.
    TriggerSent { step: WireStep },

    /// The session was dropped, locally (`remote == false`) or by an action.
    SessionCancelled { remote: bool },
}
