//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SessionController / ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, gate, indicators, panel, tag reader, messaging,
//! storage) implement these traits. The domain consumes them via generics,
//! so the controller never touches hardware directly.

use crate::config::RevendConfig;
use crate::protocol::messages::TriggerRequest;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw chute sensors.
pub trait SensorPort {
    fn read_ir(&mut self) -> u16;
    fn read_metal(&mut self) -> u16;
}

/// Non-blocking identity tag reader.
pub trait TagReaderPort {
    /// Returns the dotted-decimal UID of a tag in the field, if any.
    fn poll_tag(&mut self) -> Option<String>;
}

/// Raw level of the cancel button. Edge detection is the caller's job.
pub trait CancelInputPort {
    fn is_cancel_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// The item gate servo.
pub trait GatePort {
    fn open_gate(&mut self);
    fn close_gate(&mut self);
}

/// Indicator lamp channels. At most one is lit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorChannel {
    Reject,
    Accept,
    Idle,
}

pub trait IndicatorPort {
    /// Light `channel` and turn every other channel off.
    fn set_indicator(&mut self, channel: IndicatorChannel);
    /// Turn every channel off.
    fn clear_indicators(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Panel ports (display + audio)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn show_text(&mut self, text: &str);
    fn show_qr_code(&mut self, url: &str);
    /// Advance the loading animation by one frame.
    fn show_loading_animation(&mut self);
}

/// Audio prompts the controller may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Boot,
    Welcome,
    InsertItems,
}

pub trait AudioPort {
    fn play_cue(&mut self, cue: AudioCue);
}

/// Everything the controller drives on the device itself.
pub trait DevicePorts: SensorPort + GatePort + IndicatorPort + DisplayPort + AudioPort {}

impl<T> DevicePorts for T where T: SensorPort + GatePort + IndicatorPort + DisplayPort + AudioPort {}

// ───────────────────────────────────────────────────────────────
// Messaging port (domain → remote authority)
// ───────────────────────────────────────────────────────────────

/// Outbound trigger requests. Delivery is best-effort: implementations log
/// failures and never retry.
pub trait TriggerPort {
    fn send_trigger(&mut self, request: &TriggerRequest);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock. All timers are deadlines against this.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting; invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] if no stored config exists.
    fn load(&self) -> Result<RevendConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &RevendConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
