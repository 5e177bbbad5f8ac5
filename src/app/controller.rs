//! Session controller, the hexagonal core.
//!
//! [`SessionController`] owns the session record, the classifier, the
//! debounce-window timer and the gate coordinator. It exposes a
//! hardware-agnostic API; all I/O flows through port traits injected at
//! call sites, so the whole flow is testable with mock adapters.
//!
//! ```text
//!  SessionCommand ──▶ ┌──────────────────────────┐ ──▶ TriggerPort
//!                     │    SessionController      │
//!    DevicePorts ◀──▶ │ Session · Classifier · Gate│ ──▶ EventSink
//!                     └──────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::RevendConfig;
use crate::control::actuation::{ActuationCoordinator, GateState};
use crate::control::timer::Deadline;
use crate::fsm::session::Session;
use crate::fsm::{Phase, Step};
use crate::protocol::messages::{ActionResponse, TriggerRequest};
use crate::sensors::classifier::{Candidate, SensorClassifier, SensorReading, Verdict};

use super::commands::SessionCommand;
use super::events::AppEvent;
use super::ports::{AudioCue, DevicePorts, EventSink, GatePort, IndicatorChannel, TriggerPort};

pub struct SessionController {
    session: Session,
    classifier: SensorClassifier,
    /// Debounce window: one classifier tick per expiry while in `Revend`.
    sensor_window: Deadline,
    actuation: ActuationCoordinator,
    device_id: String,
    /// An auth trigger is out and no action has answered it yet.
    awaiting_auth: bool,
}

impl SessionController {
    pub fn new(config: &RevendConfig) -> Self {
        Self {
            session: Session::new(),
            classifier: SensorClassifier::from_config(config),
            sensor_window: Deadline::new(u64::from(config.sensor_interval_ms)),
            actuation: ActuationCoordinator::new(u64::from(config.servo_dwell_ms)),
            device_id: String::from(config.device_token.as_str()),
            awaiting_auth: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    /// Tag scans are only considered while no session is running.
    pub fn accepts_tags(&self) -> bool {
        self.session.step.is_resting()
    }

    pub fn is_awaiting_auth(&self) -> bool {
        self.awaiting_auth
    }

    pub fn gate_state(&self) -> GateState {
        self.actuation.state()
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    // ── Commands ──────────────────────────────────────────────

    pub fn handle_command(
        &mut self,
        cmd: SessionCommand,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        triggers: &mut impl TriggerPort,
        sink: &mut impl EventSink,
    ) {
        debug!("Session: {:?} at {} ms", cmd, now_ms);
        match cmd {
            SessionCommand::TagScanned(identity) => self.on_tag(&identity, hw, triggers, sink),
            SessionCommand::CancelPressed => self.on_cancel_pressed(hw, triggers, sink),
            SessionCommand::Action(action) => self.on_action(action, hw, sink),
        }
    }

    fn on_tag(
        &mut self,
        identity: &str,
        hw: &mut impl DevicePorts,
        triggers: &mut impl TriggerPort,
        sink: &mut impl EventSink,
    ) {
        if !self.accepts_tags() {
            debug!("Session: tag {} ignored in {}", identity, self.session.step.name());
            return;
        }
        if identity.is_empty() || identity == self.session.identity {
            return;
        }

        info!("Session: tag {}", identity);
        self.session.begin(identity);
        self.send(TriggerRequest::auth(&self.device_id, identity), triggers, sink);
        sink.emit(&AppEvent::SessionStarted {
            identity: identity.to_owned(),
        });
        self.awaiting_auth = true;
        hw.show_loading_animation();
    }

    fn on_cancel_pressed(
        &mut self,
        hw: &mut impl DevicePorts,
        triggers: &mut impl TriggerPort,
        sink: &mut impl EventSink,
    ) {
        if self.session.step == Step::Cancel || !self.session.is_active() {
            debug!("Session: cancel ignored, nothing to cancel");
            return;
        }
        let request = TriggerRequest::cancel(&self.device_id, &self.session.identity);
        self.send(request, triggers, sink);
        self.cancel(false, hw, sink);
    }

    fn on_action(
        &mut self,
        action: ActionResponse,
        hw: &mut impl DevicePorts,
        sink: &mut impl EventSink,
    ) {
        match action.step {
            Some(Step::Cancel) => self.cancel(true, hw, sink),
            Some(Step::Auth) => {
                if !self.session.is_active() {
                    warn!("Session: auth action without an identity, ignored");
                    return;
                }
                let from = self.session.step;
                self.sensor_window.stop();
                self.session.enter_auth(action.data.state, &action.data.link);
                info!("Session: auth resolved as {:?}", action.data.state);
                sink.emit(&AppEvent::AuthResolved {
                    state: action.data.state,
                });
                if from != Step::Auth {
                    sink.emit(&AppEvent::StepChanged {
                        from,
                        to: Step::Auth,
                    });
                }
            }
            Some(Step::Revend | Step::Idle) | None => {
                debug!("Session: action with step {:?} ignored", action.step);
                return;
            }
        }
        self.awaiting_auth = false;
    }

    fn cancel(&mut self, remote: bool, hw: &mut impl DevicePorts, sink: &mut impl EventSink) {
        let from = self.session.step;
        self.session.clear();
        self.sensor_window.stop();
        self.awaiting_auth = false;
        hw.clear_indicators();
        hw.show_text("Canceled");
        info!("Session: canceled ({})", if remote { "remote" } else { "button" });
        sink.emit(&AppEvent::SessionCancelled { remote });
        if from != Step::Cancel {
            sink.emit(&AppEvent::StepChanged {
                from,
                to: Step::Cancel,
            });
        }
    }

    // ── Per-iteration phase handling ──────────────────────────

    /// Advance the active phase. A no-op while resting.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        triggers: &mut impl TriggerPort,
        sink: &mut impl EventSink,
    ) {
        match Phase::of(self.session.step, self.session.state) {
            Phase::Resting => {}
            Phase::EnterRevend => self.enter_revend(now_ms, hw, sink),
            Phase::ShowRegistration => {
                if !self.session.debounce.latched {
                    hw.show_qr_code(&self.session.registration_link);
                    self.session.debounce.latched = true;
                }
            }
            Phase::AwaitingState => {
                if !self.session.debounce.latched {
                    warn!("Session: auth action carried no usable state, waiting");
                    self.session.debounce.latched = true;
                }
            }
            Phase::Accepting => self.accept_tick(now_ms, hw, triggers, sink),
        }
    }

    fn enter_revend(&mut self, now_ms: u64, hw: &mut impl DevicePorts, sink: &mut impl EventSink) {
        self.session.step = Step::Revend;
        self.sensor_window.start(now_ms);
        hw.show_text("Insert items");
        hw.play_cue(AudioCue::InsertItems);
        sink.emit(&AppEvent::StepChanged {
            from: Step::Auth,
            to: Step::Revend,
        });
    }

    fn accept_tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        triggers: &mut impl TriggerPort,
        sink: &mut impl EventSink,
    ) {
        if !self.sensor_window.just_finished(now_ms) {
            return;
        }
        self.sensor_window.repeat(now_ms);

        let reading = SensorReading {
            ir: hw.read_ir(),
            metal: hw.read_metal(),
        };
        let outcome = self.classifier.classify(reading, &mut self.session.debounce);
        debug!(
            "Chute: ir={} metal={} -> {:?}",
            reading.ir, reading.metal, outcome.candidate
        );

        if outcome.candidate == Candidate::Empty {
            hw.set_indicator(IndicatorChannel::Idle);
        }
        if let Some(verdict) = outcome.commit {
            self.score(verdict, now_ms, hw, triggers, sink);
        }
    }

    fn score(
        &mut self,
        verdict: Verdict,
        now_ms: u64,
        hw: &mut impl DevicePorts,
        triggers: &mut impl TriggerPort,
        sink: &mut impl EventSink,
    ) {
        match verdict {
            Verdict::Accept => {
                self.session.points_accepted += 1;
                hw.set_indicator(IndicatorChannel::Accept);
                self.actuation.request_open(now_ms, hw);
            }
            Verdict::Reject => {
                self.session.points_rejected += 1;
                hw.set_indicator(IndicatorChannel::Reject);
            }
        }
        info!(
            "Chute: {:?} (accepted={} rejected={})",
            verdict, self.session.points_accepted, self.session.points_rejected
        );
        sink.emit(&AppEvent::ItemScored {
            verdict,
            accepted: self.session.points_accepted,
            rejected: self.session.points_rejected,
        });
        let request = TriggerRequest::status(
            &self.device_id,
            &self.session.identity,
            self.session.points_rejected,
            self.session.points_accepted,
        );
        self.send(request, triggers, sink);
    }

    /// Close the gate once its dwell has elapsed.
    pub fn service_gate(&mut self, now_ms: u64, gate: &mut impl GatePort) {
        self.actuation.tick(now_ms, gate);
    }

    fn send(&self, request: TriggerRequest, triggers: &mut impl TriggerPort, sink: &mut impl EventSink) {
        triggers.send_trigger(&request);
        sink.emit(&AppEvent::TriggerSent { step: request.step });
    }
}
