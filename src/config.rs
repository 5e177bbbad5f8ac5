//! System configuration parameters
//!
//! All tunable parameters for the Revend node.
//! Values are loaded from NVS at boot and fall back to these defaults.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Short fixed-capacity string used for identifiers and credentials.
pub type ShortString = heapless::String<32>;
/// Longer fixed-capacity string used for topics and URLs.
pub type LongString = heapless::String<64>;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevendConfig {
    // --- Identity & messaging ---
    /// Device token issued by the remote authority. Also the `device_id`
    /// field of every trigger and the suffix of the action topic.
    pub device_token: ShortString,
    /// Topic all trigger requests are published to.
    pub trigger_topic: LongString,
    /// Prefix of the per-device action topic (`<prefix><device_token>`).
    pub action_topic_prefix: LongString,
    /// MQTT broker URL.
    pub broker_url: LongString,

    // --- WiFi ---
    pub wifi_ssid: ShortString,
    pub wifi_password: LongString,

    // --- Classification ---
    /// IR reading below this value means an object is in the chute.
    pub ir_threshold: u16,
    /// Metal sensor reading below this value means the object is metallic.
    pub metal_threshold: u16,
    /// Consistent ticks (beyond the first) before a classification commits.
    pub debounce_threshold: u8,

    // --- Timing ---
    /// Debounce window: interval between classification attempts (ms).
    pub sensor_interval_ms: u32,
    /// Gate dwell time before the servo returns (ms).
    pub servo_dwell_ms: u32,
    /// Idle welcome message repeat interval (ms).
    pub welcome_interval_ms: u32,
    /// Loading animation frame interval (ms).
    pub loading_frame_ms: u32,
    /// Control loop sleep between iterations (ms).
    pub control_loop_interval_ms: u32,

    // --- Gate servo ---
    pub gate_open_angle: u8,
    pub gate_closed_angle: u8,

    // --- Audio ---
    /// Audio player volume (0-30).
    pub audio_volume: u8,
}

impl Default for RevendConfig {
    fn default() -> Self {
        Self {
            device_token: short("2ZdEzVzwZae0BkYAmILaXL7W05R"),
            trigger_topic: long("revend/trigger"),
            action_topic_prefix: long("revend/action/"),
            broker_url: long("mqtt://192.168.254.137:1883"),

            wifi_ssid: short("hub space"),
            wifi_password: long("Password123@"),

            // Classification
            ir_threshold: 1200,
            metal_threshold: 500,
            debounce_threshold: 2,

            // Timing
            sensor_interval_ms: 250,
            servo_dwell_ms: 400,
            welcome_interval_ms: 3000,
            loading_frame_ms: 100,
            control_loop_interval_ms: 10,

            // Gate
            gate_open_angle: 180,
            gate_closed_angle: 0,

            audio_volume: 8,
        }
    }
}

impl RevendConfig {
    /// Per-device action topic: `<action_topic_prefix><device_token>`.
    pub fn action_topic(&self) -> String {
        let mut topic = String::from(self.action_topic_prefix.as_str());
        topic.push_str(&self.device_token);
        topic
    }

    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_token.is_empty() {
            return Err(ConfigError::ValidationFailed("device_token must not be empty"));
        }
        if self.trigger_topic.is_empty() || self.action_topic_prefix.is_empty() {
            return Err(ConfigError::ValidationFailed("topics must not be empty"));
        }
        if self.device_token.len() + self.action_topic_prefix.len() > 64 {
            return Err(ConfigError::ValidationFailed(
                "action topic (prefix + token) must fit in 64 bytes",
            ));
        }
        if !(1..=4095).contains(&self.ir_threshold) {
            return Err(ConfigError::ValidationFailed("ir_threshold must be 1-4095"));
        }
        if !(1..=4095).contains(&self.metal_threshold) {
            return Err(ConfigError::ValidationFailed("metal_threshold must be 1-4095"));
        }
        if !(1..=10).contains(&self.debounce_threshold) {
            return Err(ConfigError::ValidationFailed("debounce_threshold must be 1-10"));
        }
        if !(50..=5_000).contains(&self.sensor_interval_ms) {
            return Err(ConfigError::ValidationFailed("sensor_interval_ms must be 50-5000"));
        }
        if !(100..=5_000).contains(&self.servo_dwell_ms) {
            return Err(ConfigError::ValidationFailed("servo_dwell_ms must be 100-5000"));
        }
        if self.welcome_interval_ms < 500 {
            return Err(ConfigError::ValidationFailed("welcome_interval_ms must be >= 500"));
        }
        if self.loading_frame_ms == 0 || self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("frame and loop intervals must be > 0"));
        }
        if self.gate_open_angle > 180 || self.gate_closed_angle > 180 {
            return Err(ConfigError::ValidationFailed("gate angles must be 0-180"));
        }
        if self.gate_open_angle == self.gate_closed_angle {
            return Err(ConfigError::ValidationFailed("gate open and closed angles must differ"));
        }
        if self.audio_volume > 30 {
            return Err(ConfigError::ValidationFailed("audio_volume must be 0-30"));
        }
        Ok(())
    }
}

// Only fed compile-time literals; an oversized one trips the assert in tests.
fn short(s: &str) -> ShortString {
    let mut out = ShortString::new();
    let pushed = out.push_str(s);
    debug_assert!(pushed.is_ok(), "default literal exceeds capacity: {s}");
    out
}

fn long(s: &str) -> LongString {
    let mut out = LongString::new();
    let pushed = out.push_str(s);
    debug_assert!(pushed.is_ok(), "default literal exceeds capacity: {s}");
    out
}
