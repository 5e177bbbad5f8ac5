//! Inbound commands to the session controller.
//!
//! These represent things that happened in the outside world (a tag in the
//! field, the cancel button, a message from the remote authority) that the
//! [`SessionController`](super::controller::SessionController) interprets
//! and acts upon.

use crate::protocol::messages::ActionResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// A tag with this dotted-decimal identity is in the reader field.
    TagScanned(String),

    /// Rising edge on the cancel input.
    CancelPressed,

    /// A decoded action addressed to this device.
    Action(ActionResponse),
}
