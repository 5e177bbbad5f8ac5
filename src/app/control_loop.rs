//! Cooperative control loop.
//!
//! One thread, one call to [`ControlLoop::iterate`] per control tick. Each
//! iteration, in order:
//!
//! 1. apply at most one inbound action from the gateway,
//! 2. sample the cancel input for a rising edge,
//! 3. poll for a tag while resting, otherwise advance the session phase,
//! 4. service the gate dwell timer,
//! 5. repeat the idle welcome while resting,
//! 6. advance the loading animation while an auth answer is pending.
//!
//! Inbound actions are therefore always applied before cancel or sensor
//! handling in the same iteration.

use log::info;

use crate::config::RevendConfig;
use crate::control::timer::Deadline;
use crate::drivers::cancel_button::CancelButton;
use crate::protocol::gateway::MessagingGateway;
use crate::protocol::transport::Transport;

use super::commands::SessionCommand;
use super::controller::SessionController;
use super::events::AppEvent;
use super::ports::{AudioCue, CancelInputPort, ClockPort, DevicePorts, EventSink, TagReaderPort};

/// Text shown while the node waits for a tag.
pub const WELCOME_TEXT: &str = "Revend";

pub struct ControlLoop<H, T, S, C>
where
    H: DevicePorts + TagReaderPort + CancelInputPort,
    T: Transport,
    S: EventSink,
    C: ClockPort,
{
    controller: SessionController,
    gateway: MessagingGateway<T>,
    cancel: CancelButton,
    welcome: Deadline,
    loading: Deadline,
    interval_ms: u32,
    hw: H,
    sink: S,
    clock: C,
}

impl<H, T, S, C> ControlLoop<H, T, S, C>
where
    H: DevicePorts + TagReaderPort + CancelInputPort,
    T: Transport,
    S: EventSink,
    C: ClockPort,
{
    pub fn new(config: &RevendConfig, hw: H, transport: T, sink: S, clock: C) -> Self {
        Self {
            controller: SessionController::new(config),
            gateway: MessagingGateway::new(transport, config),
            cancel: CancelButton::new(),
            welcome: Deadline::new(u64::from(config.welcome_interval_ms)),
            loading: Deadline::new(u64::from(config.loading_frame_ms)),
            interval_ms: config.control_loop_interval_ms,
            hw,
            sink,
            clock,
        }
    }

    /// Boot greeting. Call once before the first [`iterate`](Self::iterate).
    pub fn start(&mut self) {
        let now_ms = self.clock.now_ms();
        self.hw.close_gate();
        self.hw.clear_indicators();
        self.hw.play_cue(AudioCue::Boot);
        self.show_welcome();
        self.welcome.start(now_ms);
        self.sink.emit(&AppEvent::Started);
        info!("Control loop started, listening on {}", self.gateway.action_topic());
    }

    /// Run one cooperative iteration.
    pub fn iterate(&mut self) {
        let now_ms = self.clock.now_ms();

        // 1. Inbound action
        if let Some(action) = self.gateway.poll_action() {
            self.dispatch(SessionCommand::Action(action), now_ms);
        }

        // 2. Cancel edge
        let pressed = self.hw.is_cancel_pressed();
        if self.cancel.update(pressed) {
            self.dispatch(SessionCommand::CancelPressed, now_ms);
        }

        // 3. Tag scan or active phase
        if self.controller.accepts_tags() {
            if let Some(identity) = self.hw.poll_tag() {
                self.dispatch(SessionCommand::TagScanned(identity), now_ms);
            }
        } else {
            self.controller
                .tick(now_ms, &mut self.hw, &mut self.gateway, &mut self.sink);
        }

        // 4. Gate dwell
        self.controller.service_gate(now_ms, &mut self.hw);

        // 5. Idle welcome
        self.service_welcome(now_ms);

        // 6. Loading frames
        self.service_loading(now_ms);
    }

    fn dispatch(&mut self, cmd: SessionCommand, now_ms: u64) {
        self.controller
            .handle_command(cmd, now_ms, &mut self.hw, &mut self.gateway, &mut self.sink);
    }

    fn service_welcome(&mut self, now_ms: u64) {
        let idle = self.controller.accepts_tags() && !self.controller.is_awaiting_auth();
        if !idle {
            self.welcome.stop();
            return;
        }
        if !self.welcome.is_running() {
            self.welcome.start(now_ms);
        } else if self.welcome.just_finished(now_ms) {
            self.welcome.repeat(now_ms);
            self.show_welcome();
        }
    }

    fn service_loading(&mut self, now_ms: u64) {
        if !self.controller.is_awaiting_auth() {
            self.loading.stop();
            return;
        }
        if !self.loading.is_running() {
            self.loading.start(now_ms);
        } else if self.loading.just_finished(now_ms) {
            self.loading.repeat(now_ms);
            self.hw.show_loading_animation();
        }
    }

    fn show_welcome(&mut self) {
        self.hw.show_text(WELCOME_TEXT);
        self.hw.play_cue(AudioCue::Welcome);
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Sleep between iterations on the device.
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn gateway(&self) -> &MessagingGateway<T> {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut MessagingGateway<T> {
        &mut self.gateway
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
