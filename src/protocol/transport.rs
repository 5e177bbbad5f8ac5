//! Transport abstraction for the messaging gateway.
//!
//! Concrete implementations:
//! - MQTT over WiFi (`adapters::mqtt::MqttTransport`)
//! - in-memory recorders in tests
//!
//! Inbound delivery is polled: the gateway asks for at most one message per
//! control-loop iteration.

use super::channels::InboundMessage;

/// Topic-addressed publish/poll channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Publish `payload` on `topic`. Best-effort; no retry.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error>;

    /// Take the next inbound message, if any. Non-blocking.
    fn poll(&mut self) -> Option<InboundMessage>;
}

/// A null transport that discards all publishes and never receives.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), ()> {
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        None
    }
}
