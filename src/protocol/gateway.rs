//! Messaging gateway: JSON over a topic transport for one device token.
//!
//! Outbound triggers go to `trigger_topic`. Inbound actions are accepted
//! only from `action_topic_prefix + device_token`; everything else on the
//! transport is ignored. Decoding is tolerant: a malformed or partial
//! payload yields default fields rather than an error.

use log::{debug, warn};
use serde_json::Value;

use super::messages::{ActionData, ActionResponse, TriggerRequest};
use super::transport::Transport;
use crate::app::ports::TriggerPort;
use crate::config::RevendConfig;
use crate::fsm::{RegistrationState, Step};

/// Errors from [`MessagingGateway::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// Serialization failed.
    Encode,
    /// The transport refused the publish.
    Publish,
}

impl core::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encode => write!(f, "trigger encode failed"),
            Self::Publish => write!(f, "trigger publish failed"),
        }
    }
}

pub struct MessagingGateway<T: Transport> {
    transport: T,
    trigger_topic: String,
    action_topic: String,
}

impl<T: Transport> MessagingGateway<T> {
    pub fn new(transport: T, config: &RevendConfig) -> Self {
        Self {
            transport,
            trigger_topic: String::from(config.trigger_topic.as_str()),
            action_topic: config.action_topic(),
        }
    }

    pub fn trigger_topic(&self) -> &str {
        &self.trigger_topic
    }

    /// The only topic inbound actions are accepted from.
    pub fn action_topic(&self) -> &str {
        &self.action_topic
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn encode_trigger(request: &TriggerRequest) -> Result<Vec<u8>, GatewayError> {
        serde_json::to_vec(request).map_err(|_| GatewayError::Encode)
    }

    /// Decode an action payload, defaulting anything missing or mistyped.
    pub fn decode_action(payload: &[u8]) -> ActionResponse {
        let doc: Value = serde_json::from_slice(payload).unwrap_or(Value::Null);
        let data = doc.get("data");

        let step = doc.get("step").and_then(Value::as_u64).and_then(Step::from_wire);
        let state = data
            .and_then(|d| d.get("state"))
            .and_then(Value::as_u64)
            .map(RegistrationState::from_wire)
            .unwrap_or_default();
        let link = data
            .and_then(|d| d.get("link"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        ActionResponse {
            step,
            data: ActionData { state, link },
        }
    }

    pub fn publish(&mut self, request: &TriggerRequest) -> Result<(), GatewayError> {
        let payload = Self::encode_trigger(request)?;
        self.transport
            .publish(&self.trigger_topic, &payload)
            .map_err(|e| {
                debug!("Gateway: transport error {:?}", e);
                GatewayError::Publish
            })
    }

    /// Take at most one inbound message and decode it if it is ours.
    pub fn poll_action(&mut self) -> Option<ActionResponse> {
        let msg = self.transport.poll()?;
        if msg.topic.as_str() != self.action_topic {
            debug!("Gateway: ignoring message on {}", msg.topic);
            return None;
        }
        Some(Self::decode_action(&msg.payload))
    }
}

impl<T: Transport> TriggerPort for MessagingGateway<T> {
    fn send_trigger(&mut self, request: &TriggerRequest) {
        if let Err(e) = self.publish(request) {
            warn!("Gateway: {} (step {:?})", e, request.step);
        }
    }
}
