//! MQTT transport adapter.
//!
//! Implements [`Transport`] for the messaging gateway.
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with a callback. The
//!   callback runs on the MQTT task and only forwards received messages
//!   into [`ACTION_CHANNEL`]; the control loop drains that channel through
//!   [`Transport::poll`]. The action topic is (re)subscribed from the
//!   control loop after every broker (re)connect.
//! - **all other targets**: publishes are logged and recorded, inbound
//!   messages come from the same channel type so tests can inject them.

use log::info;

use crate::error::CommsError;
use crate::protocol::channels::{InboundChannel, InboundMessage, ACTION_CHANNEL};
use crate::protocol::transport::Transport;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, Ordering};
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
#[cfg(target_os = "espidf")]
use log::warn;

/// Broker session is up.
#[cfg(target_os = "espidf")]
static CONNECTED: AtomicBool = AtomicBool::new(false);
/// Set on every connect; cleared once the action topic is subscribed.
#[cfg(target_os = "espidf")]
static NEEDS_SUBSCRIBE: AtomicBool = AtomicBool::new(false);

/// Polls of the connect flag before startup gives up.
#[cfg(target_os = "espidf")]
const CONNECT_WAIT_POLLS: u32 = 100;
#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u64 = 100;

pub struct MqttTransport {
    inbound: &'static InboundChannel,
    action_topic: String,
    #[cfg(target_os = "espidf")]
    client: EspMqttClient<'static>,
    #[cfg(not(target_os = "espidf"))]
    published: Vec<(String, Vec<u8>)>,
}

impl MqttTransport {
    /// Connect to `broker_url` and subscribe to `action_topic`.
    ///
    /// Fails if the broker does not accept the session within ~10 s.
    #[cfg(target_os = "espidf")]
    pub fn connect(broker_url: &str, client_id: &str, action_topic: &str) -> Result<Self, CommsError> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(broker_url, &conf, |event| match event.payload() {
            EventPayload::Connected(_) => {
                CONNECTED.store(true, Ordering::Release);
                NEEDS_SUBSCRIBE.store(true, Ordering::Release);
            }
            EventPayload::Disconnected => {
                CONNECTED.store(false, Ordering::Release);
            }
            EventPayload::Received {
                topic: Some(topic),
                data,
                ..
            } => {
                crate::protocol::channels::forward_inbound(&ACTION_CHANNEL, topic, data);
            }
            EventPayload::Error(e) => warn!("MQTT: {:?}", e),
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT: client init failed: {}", e);
            CommsError::MqttConnectFailed
        })?;

        let mut transport = Self {
            inbound: &ACTION_CHANNEL,
            action_topic: String::from(action_topic),
            client,
        };

        let mut polls = 0;
        while !CONNECTED.load(Ordering::Acquire) {
            polls += 1;
            if polls > CONNECT_WAIT_POLLS {
                return Err(CommsError::MqttConnectFailed);
            }
            std::thread::sleep(std::time::Duration::from_millis(CONNECT_POLL_MS));
        }
        info!("MQTT: connected to {} as {}", broker_url, client_id);
        transport.ensure_subscribed()?;
        Ok(transport)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn connect(broker_url: &str, client_id: &str, action_topic: &str) -> Result<Self, CommsError> {
        info!("MQTT(sim): {} as {}", broker_url, client_id);
        Ok(Self::with_channel(&ACTION_CHANNEL, action_topic))
    }

    /// Simulation transport draining `inbound`.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_channel(inbound: &'static InboundChannel, action_topic: &str) -> Self {
        Self {
            inbound,
            action_topic: String::from(action_topic),
            published: Vec::new(),
        }
    }

    /// Everything published so far, oldest first.
    #[cfg(not(target_os = "espidf"))]
    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    pub fn action_topic(&self) -> &str {
        &self.action_topic
    }

    #[cfg(target_os = "espidf")]
    fn ensure_subscribed(&mut self) -> Result<(), CommsError> {
        if !NEEDS_SUBSCRIBE.load(Ordering::Acquire) || !CONNECTED.load(Ordering::Acquire) {
            return Ok(());
        }
        self.client
            .subscribe(&self.action_topic, QoS::AtMostOnce)
            .map_err(|_| CommsError::MqttSubscribeFailed)?;
        NEEDS_SUBSCRIBE.store(false, Ordering::Release);
        info!("MQTT: subscribed to {}", self.action_topic);
        Ok(())
    }
}

impl Transport for MqttTransport {
    type Error = CommsError;

    #[cfg(target_os = "espidf")]
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !CONNECTED.load(Ordering::Acquire) {
            return Err(CommsError::MqttPublishFailed);
        }
        self.client
            .enqueue(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| CommsError::MqttPublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        info!("MQTT(sim): {} <- {}", topic, String::from_utf8_lossy(payload));
        self.published.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        #[cfg(target_os = "espidf")]
        if let Err(e) = self.ensure_subscribed() {
            warn!("MQTT: {}", e);
        }
        self.inbound.try_receive().ok()
    }
}
