//! Trigger/action messaging protocol.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Messaging Stack                         │
//! │                                                            │
//! │  SessionController ──TriggerRequest──▶ MessagingGateway   │
//! │         ▲                                   │  JSON        │
//! │         │                                   ▼              │
//! │   ActionResponse ◀── decode ◀── Transport (publish/poll)   │
//! │                                     ▲                      │
//! │                     InboundChannel ─┘ (broker task)        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway is generic over [`transport::Transport`], so the MQTT
//! adapter and the in-memory test transport share every line of protocol
//! logic.

pub mod channels;
pub mod gateway;
pub mod messages;
pub mod transport;
