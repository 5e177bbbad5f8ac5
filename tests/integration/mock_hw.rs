//! Mock adapters for integration tests.
//!
//! Records every actuator and panel call so tests can assert on the full
//! command history without touching real GPIO/PWM/UART registers.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use revend::app::events::AppEvent;
use revend::app::ports::{
    AudioCue, AudioPort, CancelInputPort, ClockPort, DisplayPort, EventSink, GatePort,
    IndicatorChannel, IndicatorPort, SensorPort, TagReaderPort,
};
use revend::protocol::channels::InboundMessage;
use revend::protocol::messages::TriggerRequest;
use revend::protocol::transport::Transport;

// ── Device call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    OpenGate,
    CloseGate,
    Indicator(IndicatorChannel),
    ClearIndicators,
    Text(String),
    Qr(String),
    LoadingFrame,
    Cue(AudioCue),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<DeviceCall>,
    /// Raw IR reading returned on every sample.
    pub ir: u16,
    /// Raw metal reading returned on every sample.
    pub metal: u16,
    /// Tags handed out one per poll.
    pub tags: VecDeque<String>,
    /// Cancel input level.
    pub cancel_level: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            ir: 4095,
            metal: 4095,
            tags: VecDeque::new(),
            cancel_level: false,
        }
    }

    pub fn gate_open(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                DeviceCall::OpenGate => Some(true),
                DeviceCall::CloseGate => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn last_text(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|c| match c {
            DeviceCall::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    pub fn loading_frames(&self) -> usize {
        self.count(&DeviceCall::LoadingFrame)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_ir(&mut self) -> u16 {
        self.ir
    }

    fn read_metal(&mut self) -> u16 {
        self.metal
    }
}

impl TagReaderPort for MockHardware {
    fn poll_tag(&mut self) -> Option<String> {
        self.tags.pop_front()
    }
}

impl CancelInputPort for MockHardware {
    fn is_cancel_pressed(&mut self) -> bool {
        self.cancel_level
    }
}

impl GatePort for MockHardware {
    fn open_gate(&mut self) {
        self.calls.push(DeviceCall::OpenGate);
    }

    fn close_gate(&mut self) {
        self.calls.push(DeviceCall::CloseGate);
    }
}

impl IndicatorPort for MockHardware {
    fn set_indicator(&mut self, channel: IndicatorChannel) {
        self.calls.push(DeviceCall::Indicator(channel));
    }

    fn clear_indicators(&mut self) {
        self.calls.push(DeviceCall::ClearIndicators);
    }
}

impl DisplayPort for MockHardware {
    fn show_text(&mut self, text: &str) {
        self.calls.push(DeviceCall::Text(text.to_owned()));
    }

    fn show_qr_code(&mut self, url: &str) {
        self.calls.push(DeviceCall::Qr(url.to_owned()));
    }

    fn show_loading_animation(&mut self) {
        self.calls.push(DeviceCall::LoadingFrame);
    }
}

impl AudioPort for MockHardware {
    fn play_cue(&mut self, cue: AudioCue) {
        self.calls.push(DeviceCall::Cue(cue));
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Manually advanced clock; clones share the same time.
#[derive(Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── MockTransport ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockTransport {
    pub inbox: VecDeque<InboundMessage>,
    pub published: Vec<(String, Vec<u8>)>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&mut self, topic: &str, payload: &str) {
        let msg = InboundMessage::new(topic, payload.as_bytes()).expect("message fits");
        self.inbox.push_back(msg);
    }

    /// Every published payload decoded back into a trigger.
    pub fn triggers(&self) -> Vec<TriggerRequest> {
        self.published
            .iter()
            .map(|(_, p)| serde_json::from_slice(p).expect("trigger JSON"))
            .collect()
    }

    pub fn raw(&self, index: usize) -> &str {
        std::str::from_utf8(&self.published[index].1).expect("utf-8 payload")
    }
}

impl Transport for MockTransport {
    type Error = ();

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), ()> {
        self.published.push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    fn poll(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
