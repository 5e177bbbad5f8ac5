//! Inbound message channel.
//!
//! The MQTT client delivers on its own task. Messages cross into the
//! synchronous control loop through a bounded `embassy-sync` channel, the
//! only shared state between the two.
//!
//! ```text
//! ┌──────────────┐  InboundMessage  ┌──────────────┐
//! │ Broker task  │─────────────────▶│ Control Loop │
//! │ (callback)   │                  │ (sync)       │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};

/// Longest topic we accept (`action_topic_prefix` + token).
pub const TOPIC_CAPACITY: usize = 64;

/// Largest action payload we accept.
pub const PAYLOAD_CAPACITY: usize = 512;

/// Channel depth for inbound messages.
const INBOUND_DEPTH: usize = 4;

/// A raw message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<TOPIC_CAPACITY>,
    pub payload: Vec<u8, PAYLOAD_CAPACITY>,
}

impl InboundMessage {
    /// `None` if either part exceeds its capacity.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        let p = Vec::from_slice(payload).ok()?;
        Some(Self { topic: t, payload: p })
    }
}

pub type InboundChannel = Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_DEPTH>;

/// Inbound channel: broker task → control loop.
pub static ACTION_CHANNEL: InboundChannel = Channel::new();

/// Queue a message without blocking. Returns `false` if it was dropped
/// because it is oversized or the channel is full.
pub fn forward_inbound(channel: &InboundChannel, topic: &str, payload: &[u8]) -> bool {
    let Some(msg) = InboundMessage::new(topic, payload) else {
        log::warn!("MQTT: dropped oversized message on {}", topic);
        return false;
    };
    if channel.try_send(msg).is_err() {
        log::warn!("MQTT: inbound queue full, dropped message on {}", topic);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_until_full() {
        let ch = InboundChannel::new();
        for _ in 0..INBOUND_DEPTH {
            assert!(forward_inbound(&ch, "a/b", b"{}"));
        }
        assert!(!forward_inbound(&ch, "a/b", b"{}"));
        let msg = ch.try_receive().unwrap();
        assert_eq!(msg.topic.as_str(), "a/b");
        assert_eq!(&msg.payload[..], b"{}");
    }

    #[test]
    fn oversized_payload_is_dropped() {
        let ch = InboundChannel::new();
        let big = [b'x'; PAYLOAD_CAPACITY + 1];
        assert!(!forward_inbound(&ch, "t", &big));
        assert!(ch.try_receive().is_err());
    }
}
