//! End-to-end session flows through `ControlLoop` with mock adapters.
//!
//! Tag scan → auth trigger → auth action → item acceptance → gate cycle →
//! cancel, plus the idle welcome and loading animation timers.

use crate::mock_hw::{DeviceCall, MockClock, MockHardware, MockTransport, RecordingSink};

use revend::app::control_loop::{ControlLoop, WELCOME_TEXT};
use revend::app::events::AppEvent;
use revend::app::ports::{AudioCue, ClockPort, IndicatorChannel};
use revend::config::RevendConfig;
use revend::control::actuation::GateState;
use revend::fsm::{RegistrationState, Step};
use revend::protocol::messages::WireStep;
use revend::sensors::classifier::Verdict;

type Loop = ControlLoop<MockHardware, MockTransport, RecordingSink, MockClock>;

const TAG: &str = "10.20.30";

fn make_loop() -> (Loop, MockClock, RevendConfig) {
    let config = RevendConfig::default();
    let clock = MockClock::new();
    let mut lp = ControlLoop::new(
        &config,
        MockHardware::new(),
        MockTransport::new(),
        RecordingSink::new(),
        clock.clone(),
    );
    lp.start();
    (lp, clock, config)
}

/// Run `iterate` every `step_ms` until `until_ms` (inclusive).
fn run_until(lp: &mut Loop, clock: &MockClock, until_ms: u64, step_ms: u64) {
    while clock.now_ms() < until_ms {
        clock.advance(step_ms.min(until_ms - clock.now_ms()));
        lp.iterate();
    }
}

fn deliver(lp: &mut Loop, topic: &str, json: &str) {
    lp.gateway_mut().transport_mut().deliver(topic, json);
}

/// Scan `TAG` and answer the auth trigger with `state`.
fn authenticate(lp: &mut Loop, clock: &MockClock, config: &RevendConfig, state: u8) {
    lp.hw_mut().tags.push_back(TAG.to_owned());
    clock.advance(10);
    lp.iterate();
    let action = format!(r#"{{"step":2,"data":{{"state":{state}}}}}"#);
    deliver(lp, &config.action_topic(), &action);
    clock.advance(10);
    lp.iterate();
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn start_closes_gate_and_greets() {
    let (lp, _clock, _config) = make_loop();
    let hw = lp.hw();
    assert_eq!(hw.calls[0], DeviceCall::CloseGate);
    assert_eq!(hw.count(&DeviceCall::Cue(AudioCue::Boot)), 1);
    assert_eq!(hw.last_text(), Some(WELCOME_TEXT));
    assert_eq!(lp.sink().events, vec![AppEvent::Started]);
    assert_eq!(lp.controller().step(), Step::Idle);
}

// ── Full scenario ─────────────────────────────────────────────

#[test]
fn tag_auth_accept_gate_cancel() {
    let (mut lp, clock, config) = make_loop();
    let token = config.device_token.as_str().to_owned();

    // Tag scan: exactly one auth trigger, still Idle while awaiting.
    lp.hw_mut().tags.push_back(TAG.to_owned());
    clock.set(10);
    lp.iterate();
    let sent = lp.gateway().transport();
    assert_eq!(sent.published.len(), 1);
    assert_eq!(sent.published[0].0, "revend/trigger");
    assert_eq!(
        sent.raw(0),
        format!(r#"{{"step":2,"data":{{"device_id":"{token}","identity":"10.20.30"}}}}"#)
    );
    assert_eq!(lp.controller().step(), Step::Idle);
    assert!(lp.controller().is_awaiting_auth());
    assert!(lp.sink().contains(&AppEvent::SessionStarted {
        identity: TAG.to_owned()
    }));

    // Auth action for a registered identity: straight through to Revend.
    deliver(&mut lp, &config.action_topic(), r#"{"step":2,"data":{"state":1}}"#);
    clock.set(20);
    lp.iterate();
    assert_eq!(lp.controller().step(), Step::Revend);
    assert!(!lp.controller().is_awaiting_auth());
    assert!(lp.sink().contains(&AppEvent::AuthResolved {
        state: RegistrationState::AlreadyRegistered
    }));
    assert_eq!(lp.hw().last_text(), Some("Insert items"));
    assert_eq!(lp.hw().count(&DeviceCall::Cue(AudioCue::InsertItems)), 1);

    // A can in the chute: three debounce windows commit one Accept.
    lp.hw_mut().ir = 500;
    lp.hw_mut().metal = 300;
    run_until(&mut lp, &clock, 520, 10);
    assert_eq!(lp.controller().session().points_accepted, 0);
    run_until(&mut lp, &clock, 770, 10);
    assert_eq!(lp.controller().session().points_accepted, 1);
    assert!(lp.hw().gate_open());
    assert_eq!(lp.controller().gate_state(), GateState::Open { close_at_ms: 1170 });
    assert_eq!(lp.hw().count(&DeviceCall::Indicator(IndicatorChannel::Accept)), 1);
    assert!(lp.sink().contains(&AppEvent::ItemScored {
        verdict: Verdict::Accept,
        accepted: 1,
        rejected: 0
    }));

    let sent = lp.gateway().transport();
    assert_eq!(sent.published.len(), 2);
    assert_eq!(
        sent.raw(1),
        format!(
            r#"{{"step":3,"data":{{"device_id":"{token}","identity":"10.20.30","failed":0,"success":1}}}}"#
        )
    );

    // Item lingers: the latch keeps it from being scored again.
    run_until(&mut lp, &clock, 1160, 10);
    assert_eq!(lp.controller().session().points_accepted, 1);
    assert!(lp.hw().gate_open());

    // Dwell elapses: the gate closes.
    run_until(&mut lp, &clock, 1170, 10);
    assert!(!lp.hw().gate_open());
    assert_eq!(lp.controller().gate_state(), GateState::Closed);

    // Cancel pressed: one cancel trigger, session dropped.
    lp.hw_mut().cancel_level = true;
    run_until(&mut lp, &clock, 1250, 10);
    let triggers = lp.gateway().transport().triggers();
    assert_eq!(triggers.len(), 3);
    assert_eq!(triggers[2].step, WireStep::Cancel);
    assert_eq!(triggers[2].data.identity, TAG);
    assert_eq!(lp.controller().step(), Step::Cancel);
    assert_eq!(lp.controller().session().points_accepted, 0);
    assert_eq!(lp.hw().last_text(), Some("Canceled"));
    assert!(lp.sink().contains(&AppEvent::SessionCancelled { remote: false }));

    // Holding the button longer sends nothing more.
    run_until(&mut lp, &clock, 1500, 10);
    assert_eq!(lp.gateway().transport().published.len(), 3);
}

#[test]
fn reject_scores_without_opening_gate() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 3);
    assert_eq!(lp.controller().step(), Step::Revend);

    lp.hw_mut().ir = 500;
    lp.hw_mut().metal = 3000;
    run_until(&mut lp, &clock, 1000, 10);

    assert_eq!(lp.controller().session().points_rejected, 1);
    assert_eq!(lp.controller().session().points_accepted, 0);
    assert_eq!(lp.hw().count(&DeviceCall::OpenGate), 0);
    assert_eq!(lp.hw().count(&DeviceCall::Indicator(IndicatorChannel::Reject)), 1);
    let last = lp.gateway().transport().triggers().pop().unwrap();
    assert_eq!(last.step, WireStep::Revend);
    assert_eq!(last.data.failed, Some(1));
    assert_eq!(last.data.success, Some(0));
}

#[test]
fn two_items_separated_by_empty_chute_score_twice() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);

    lp.hw_mut().ir = 500;
    lp.hw_mut().metal = 300;
    run_until(&mut lp, &clock, 1000, 10);
    lp.hw_mut().ir = 4000;
    run_until(&mut lp, &clock, 1500, 10);
    lp.hw_mut().ir = 500;
    run_until(&mut lp, &clock, 2500, 10);

    assert_eq!(lp.controller().session().points_accepted, 2);
    assert_eq!(lp.hw().count(&DeviceCall::OpenGate), 2);
    assert!(lp.hw().count(&DeviceCall::Indicator(IndicatorChannel::Idle)) >= 1);
}

// ── Registration ──────────────────────────────────────────────

#[test]
fn unregistered_identity_shows_qr_once() {
    let (mut lp, clock, config) = make_loop();
    lp.hw_mut().tags.push_back(TAG.to_owned());
    clock.advance(10);
    lp.iterate();
    deliver(
        &mut lp,
        &config.action_topic(),
        r#"{"step":2,"data":{"state":2,"link":"https://example.org/r/abc"}}"#,
    );
    run_until(&mut lp, &clock, 2000, 10);

    assert_eq!(lp.controller().step(), Step::Auth);
    assert_eq!(
        lp.hw().count(&DeviceCall::Qr("https://example.org/r/abc".to_owned())),
        1
    );

    // Registration completes remotely: the session moves on to Revend.
    deliver(&mut lp, &config.action_topic(), r#"{"step":2,"data":{"state":3}}"#);
    clock.advance(10);
    lp.iterate();
    assert_eq!(lp.controller().step(), Step::Revend);
}

#[test]
fn auth_without_state_waits_and_remains_cancellable() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 0);
    run_until(&mut lp, &clock, 1000, 10);
    assert_eq!(lp.controller().step(), Step::Auth);

    deliver(&mut lp, &config.action_topic(), r#"{"step":1}"#);
    clock.advance(10);
    lp.iterate();
    assert_eq!(lp.controller().step(), Step::Cancel);
    assert!(lp.sink().contains(&AppEvent::SessionCancelled { remote: true }));
    // A remote cancel is not echoed back.
    assert!(lp
        .gateway()
        .transport()
        .triggers()
        .iter()
        .all(|t| t.step != WireStep::Cancel));
}

// ── Topic filtering and decoding ──────────────────────────────

#[test]
fn action_on_foreign_topic_is_ignored() {
    let (mut lp, clock, _config) = make_loop();
    lp.hw_mut().tags.push_back(TAG.to_owned());
    clock.advance(10);
    lp.iterate();

    deliver(&mut lp, "revend/action/someone-else", r#"{"step":2,"data":{"state":1}}"#);
    run_until(&mut lp, &clock, 500, 10);
    assert_eq!(lp.controller().step(), Step::Idle);
    assert!(lp.controller().is_awaiting_auth());
}

#[test]
fn unknown_action_step_is_ignored() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    deliver(&mut lp, &config.action_topic(), r#"{"step":7,"data":{}}"#);
    deliver(&mut lp, &config.action_topic(), "not json at all");
    run_until(&mut lp, &clock, 200, 10);
    assert_eq!(lp.controller().step(), Step::Revend);
}

#[test]
fn cancel_with_no_session_sends_nothing() {
    let (mut lp, clock, _config) = make_loop();
    lp.hw_mut().cancel_level = true;
    run_until(&mut lp, &clock, 200, 10);
    assert!(lp.gateway().transport().published.is_empty());
    assert_eq!(lp.controller().step(), Step::Idle);
}

#[test]
fn single_sample_cancel_press_cancels() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    lp.hw_mut().cancel_level = true;
    clock.advance(10);
    lp.iterate();
    lp.hw_mut().cancel_level = false;
    run_until(&mut lp, &clock, 300, 10);

    assert_eq!(lp.controller().step(), Step::Cancel);
    let triggers = lp.gateway().transport().triggers();
    assert_eq!(triggers.len(), 2);
    assert_eq!(triggers[1].step, WireStep::Cancel);
}

#[test]
fn cancel_wins_over_pending_commit() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    lp.hw_mut().ir = 500;
    lp.hw_mut().metal = 300;
    // Two of the three windows needed for a commit have run by 520.
    run_until(&mut lp, &clock, 750, 10);
    lp.hw_mut().cancel_level = true;
    clock.advance(10);
    lp.iterate();
    run_until(&mut lp, &clock, 1500, 10);

    assert_eq!(lp.controller().step(), Step::Cancel);
    assert_eq!(lp.hw().count(&DeviceCall::OpenGate), 0);
    let steps: Vec<WireStep> = lp
        .gateway()
        .transport()
        .triggers()
        .iter()
        .map(|t| t.step)
        .collect();
    assert_eq!(steps, vec![WireStep::Auth, WireStep::Cancel]);
}

#[test]
fn new_tag_after_cancel_starts_fresh_session() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    deliver(&mut lp, &config.action_topic(), r#"{"step":1}"#);
    clock.advance(10);
    lp.iterate();
    assert_eq!(lp.controller().step(), Step::Cancel);

    lp.hw_mut().tags.push_back(TAG.to_owned());
    clock.advance(10);
    lp.iterate();
    let triggers = lp.gateway().transport().triggers();
    assert_eq!(triggers.len(), 2);
    assert!(triggers.iter().all(|t| t.step == WireStep::Auth));
    assert!(lp.controller().is_awaiting_auth());
}

#[test]
fn second_tag_while_awaiting_auth_replaces_identity() {
    let (mut lp, clock, _config) = make_loop();
    for tag in ["1.1.1", "2.2.2", "2.2.2"] {
        lp.hw_mut().tags.push_back(tag.to_owned());
        clock.advance(10);
        lp.iterate();
    }

    assert_eq!(lp.controller().session().identity, "2.2.2");
    assert!(lp.controller().is_awaiting_auth());
    let auths: Vec<String> = lp
        .gateway()
        .transport()
        .triggers()
        .into_iter()
        .filter(|t| t.step == WireStep::Auth)
        .map(|t| t.data.identity)
        .collect();
    assert_eq!(auths, vec!["1.1.1".to_owned(), "2.2.2".to_owned()]);
}

#[test]
fn duplicate_auth_during_revend_keeps_tallies() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    lp.hw_mut().ir = 500;
    lp.hw_mut().metal = 300;
    run_until(&mut lp, &clock, 1000, 10);
    assert_eq!(lp.controller().session().points_accepted, 1);

    deliver(&mut lp, &config.action_topic(), r#"{"step":2,"data":{"state":1}}"#);
    clock.advance(10);
    lp.iterate();

    // The entry prompt repeats, the session and its tallies carry on.
    assert_eq!(lp.controller().step(), Step::Revend);
    assert_eq!(lp.controller().session().identity, TAG);
    assert_eq!(lp.controller().session().points_accepted, 1);
    assert_eq!(lp.hw().count(&DeviceCall::Cue(AudioCue::InsertItems)), 2);

    // The item still in the chute stays scored; it counts again only after
    // it leaves and comes back.
    run_until(&mut lp, &clock, 2000, 10);
    assert_eq!(lp.controller().session().points_accepted, 1);
    lp.hw_mut().ir = 4000;
    run_until(&mut lp, &clock, 2500, 10);
    lp.hw_mut().ir = 500;
    run_until(&mut lp, &clock, 3500, 10);
    assert_eq!(lp.controller().session().points_accepted, 2);
}

#[test]
fn tags_are_not_polled_during_a_session() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    lp.hw_mut().tags.push_back("9.9.9".to_owned());
    run_until(&mut lp, &clock, 500, 10);
    assert_eq!(lp.controller().session().identity, TAG);
    assert_eq!(lp.hw().tags.len(), 1);
}

// ── Welcome and loading timers ────────────────────────────────

#[test]
fn welcome_repeats_while_idle() {
    let (mut lp, clock, config) = make_loop();
    let period = u64::from(config.welcome_interval_ms);
    run_until(&mut lp, &clock, period * 3, 10);
    // Boot greeting plus one per elapsed period.
    assert_eq!(lp.hw().count(&DeviceCall::Text(WELCOME_TEXT.to_owned())), 4);
}

#[test]
fn welcome_pauses_during_session_and_resumes_after_cancel() {
    let (mut lp, clock, config) = make_loop();
    let period = u64::from(config.welcome_interval_ms);
    authenticate(&mut lp, &clock, &config, 1);
    lp.hw_mut().clear_calls();

    run_until(&mut lp, &clock, period * 3, 10);
    assert_eq!(lp.hw().count(&DeviceCall::Text(WELCOME_TEXT.to_owned())), 0);

    deliver(&mut lp, &config.action_topic(), r#"{"step":1}"#);
    clock.advance(10);
    lp.iterate();
    let cancelled_at = clock.now_ms();
    assert_eq!(lp.hw().last_text(), Some("Canceled"));

    run_until(&mut lp, &clock, cancelled_at + period - 20, 10);
    assert_eq!(lp.hw().last_text(), Some("Canceled"));
    run_until(&mut lp, &clock, cancelled_at + period + 20, 10);
    assert_eq!(lp.hw().last_text(), Some(WELCOME_TEXT));
}

#[test]
fn loading_animates_only_while_awaiting_auth() {
    let (mut lp, clock, config) = make_loop();
    let frame = u64::from(config.loading_frame_ms);
    lp.hw_mut().tags.push_back(TAG.to_owned());
    clock.advance(10);
    lp.iterate();
    let scanned_at = clock.now_ms();
    assert_eq!(lp.hw().loading_frames(), 1);

    run_until(&mut lp, &clock, scanned_at + frame * 5, 10);
    assert_eq!(lp.hw().loading_frames(), 6);

    deliver(&mut lp, &config.action_topic(), r#"{"step":2,"data":{"state":1}}"#);
    clock.advance(10);
    lp.iterate();
    let frames = lp.hw().loading_frames();
    run_until(&mut lp, &clock, scanned_at + frame * 20, 10);
    assert_eq!(lp.hw().loading_frames(), frames);
}

#[test]
fn step_changes_are_reported_in_order() {
    let (mut lp, clock, config) = make_loop();
    authenticate(&mut lp, &clock, &config, 1);
    let steps: Vec<(Step, Step)> = lp
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StepChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(steps, vec![(Step::Idle, Step::Auth), (Step::Auth, Step::Revend)]);
}
