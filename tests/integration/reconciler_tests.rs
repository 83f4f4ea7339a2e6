//! Integration tests for ControllerService → reconcilers → ports.
//!
//! Each test drives the service directly with explicit timestamps so the
//! timeout boundaries can be pinned down to the millisecond.

use crate::mock_hw::{ActuatorCall, MockHw, MockStore, RecordingSink, Written, path};

use roomctl::app::commands::PendingCommand;
use roomctl::app::events::{AppEvent, ControlSource, SensorKind, StoreOp};
use roomctl::app::ports::ActuatorId;
use roomctl::app::service::ControllerService;
use roomctl::config::ControllerConfig;
use roomctl::error::StoreError;
use roomctl::reconciler::Mode;
use roomctl::reconciler::context::SensorReading;

struct Harness {
    svc: ControllerService,
    hw: MockHw,
    store: MockStore,
    sink: RecordingSink,
}

impl Harness {
    fn started() -> Self {
        let mut h = Self {
            svc: ControllerService::new(&ControllerConfig::default()).unwrap(),
            hw: MockHw::new(),
            store: MockStore::new(),
            sink: RecordingSink::new(),
        };
        h.svc.start(&mut h.hw, &mut h.store, &mut h.sink);
        h.hw.calls.clear();
        h.store.clear_writes();
        h.sink.events.clear();
        h
    }

    fn poll(&mut self, now: u32) {
        self.svc
            .poll_commands(now, &mut self.hw, &mut self.store, &mut self.sink);
    }

    fn tick(&mut self, now: u32) {
        self.svc
            .reconcile(now, &mut self.hw, &mut self.store, &mut self.sink);
    }

    fn telemetry(&mut self) {
        self.svc
            .push_telemetry(&mut self.hw, &mut self.store, &mut self.sink);
    }

    fn engaged(&self, id: ActuatorId) -> bool {
        self.svc.state(id).engaged
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_drives_everything_off_and_publishes_zero() {
    let mut svc = ControllerService::new(&ControllerConfig::default()).unwrap();
    let mut hw = MockHw::new();
    let mut store = MockStore::new();
    let mut sink = RecordingSink::new();

    svc.start(&mut hw, &mut store, &mut sink);

    for id in ActuatorId::ALL {
        assert!(!svc.state(id).engaged);
        assert_eq!(svc.mode(id), Mode::Auto);
        assert_eq!(store.int(&format!("{}/status", id.key())), Some(0));
    }
    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::Relay { actuator: ActuatorId::Light, on: false },
            ActuatorCall::Relay { actuator: ActuatorId::Device, on: false },
            ActuatorCall::Servo { angle: 0 },
        ]
    );
    assert!(sink.events.contains(&AppEvent::Started));
}

// ── Motion rule ───────────────────────────────────────────────

#[test]
fn motion_turns_light_on_and_writes_flag_once() {
    let mut h = Harness::started();
    h.hw.room_motion = true;

    for t in [0, 500, 1_000, 1_500] {
        h.tick(t);
    }

    assert!(h.engaged(ActuatorId::Light));
    assert!(h.hw.relay_on(ActuatorId::Light));
    assert_eq!(h.store.writes_to("light/status"), vec![Written::Int(1)]);
    assert_eq!(h.store.writes_to("motion/room"), vec![Written::Int(1)]);
    assert!(!h.engaged(ActuatorId::Device), "dorm PIR saw nothing");
}

#[test]
fn light_turns_off_only_after_strictly_more_than_motion_timeout() {
    let mut h = Harness::started();
    h.hw.room_motion = true;
    h.tick(1_000);
    h.hw.room_motion = false;

    h.tick(3_000);
    h.tick(6_000);
    assert!(h.engaged(ActuatorId::Light), "exactly 5000 ms is not yet expired");

    h.tick(6_001);
    assert!(!h.engaged(ActuatorId::Light));
    assert!(!h.hw.relay_on(ActuatorId::Light));
    assert_eq!(
        h.store.writes_to("light/status"),
        vec![Written::Int(1), Written::Int(0)]
    );
}

#[test]
fn renewed_motion_extends_the_on_period() {
    let mut h = Harness::started();
    h.hw.room_motion = true;
    h.tick(0);
    h.hw.room_motion = false;
    h.tick(4_000);
    h.hw.room_motion = true;
    h.tick(4_500);
    h.hw.room_motion = false;

    h.tick(9_000);
    assert!(h.engaged(ActuatorId::Light));
    h.tick(9_501);
    assert!(!h.engaged(ActuatorId::Light));
    assert_eq!(h.store.writes_to("motion/room"), vec![Written::Int(1)]);
}

// ── Command intake ────────────────────────────────────────────

#[test]
fn command_on_engages_enters_manual_and_is_acknowledged() {
    let mut h = Harness::started();
    h.store.remote_set("device/control", 1);

    h.poll(2_000);

    assert!(h.engaged(ActuatorId::Device));
    assert!(h.hw.relay_on(ActuatorId::Device));
    assert_eq!(h.svc.mode(ActuatorId::Device), Mode::Manual { entered_at: 2_000 });
    assert_eq!(h.store.int("device/control"), Some(-1));
    assert_eq!(h.store.int("device/status"), Some(1));
    assert!(h.sink.events.contains(&AppEvent::CommandAcknowledged {
        actuator: ActuatorId::Device,
        command: PendingCommand::On,
    }));
    assert!(h.sink.events.contains(&AppEvent::OutputChanged {
        actuator: ActuatorId::Device,
        engaged: true,
        source: ControlSource::Manual,
    }));
}

#[test]
fn manual_off_beats_motion_until_timeout() {
    let mut h = Harness::started();
    h.hw.room_motion = true;
    h.tick(0);
    assert!(h.engaged(ActuatorId::Light));

    h.store.remote_set("light/control", 0);
    h.poll(100);
    assert!(!h.engaged(ActuatorId::Light));

    for t in (200..=10_100).step_by(500) {
        h.tick(t);
        assert!(!h.engaged(ActuatorId::Light), "motion ignored in MANUAL at t={t}");
    }
    h.tick(10_100);
    assert!(h.svc.mode(ActuatorId::Light).is_manual());

    h.tick(10_101);
    assert_eq!(h.svc.mode(ActuatorId::Light), Mode::Auto);
    assert!(h.engaged(ActuatorId::Light), "motion rule resumes on reversion");
}

#[test]
fn repeated_command_resets_manual_timer() {
    let mut h = Harness::started();
    h.store.remote_set("pump/control", 1);
    h.poll(0);
    h.store.remote_set("pump/control", 1);
    h.poll(8_000);

    h.tick(10_001);
    assert!(h.svc.mode(ActuatorId::Pump).is_manual());
    h.tick(18_001);
    assert_eq!(h.svc.mode(ActuatorId::Pump), Mode::Auto);
}

#[test]
fn on_command_twice_does_not_toggle() {
    let mut h = Harness::started();
    h.store.remote_set("light/control", 1);
    h.poll(0);
    h.store.remote_set("light/control", 1);
    h.poll(1_000);

    assert!(h.engaged(ActuatorId::Light));
    assert_eq!(h.store.writes_to("light/status"), vec![Written::Int(1)]);
    assert_eq!(
        h.hw.calls,
        vec![ActuatorCall::Relay {
            actuator: ActuatorId::Light,
            on: true
        }]
    );
    assert_eq!(h.store.int("light/control"), Some(-1));
}

#[test]
fn command_matching_state_acknowledges_without_status_write() {
    let mut h = Harness::started();
    h.store.remote_set("light/control", 0);

    h.poll(500);

    assert!(!h.engaged(ActuatorId::Light));
    assert!(h.svc.mode(ActuatorId::Light).is_manual());
    assert_eq!(h.store.int("light/control"), Some(-1));
    assert!(h.store.writes_to("light/status").is_empty());
    assert!(h.hw.calls.is_empty());
}

#[test]
fn no_op_and_missing_commands_change_nothing() {
    let mut h = Harness::started();
    h.store.remote_set("light/control", -1);

    h.poll(500);

    assert!(h.store.writes.is_empty());
    assert!(h.sink.events.is_empty());
    for id in ActuatorId::ALL {
        assert_eq!(h.svc.mode(id), Mode::Auto);
    }
}

#[test]
fn unknown_command_is_ignored_and_left_in_place() {
    let mut h = Harness::started();
    h.store.remote_set("device/control", 7);

    h.poll(500);

    assert_eq!(h.store.int("device/control"), Some(7));
    assert_eq!(h.svc.mode(ActuatorId::Device), Mode::Auto);
    assert!(h.sink.events.contains(&AppEvent::CommandIgnored {
        actuator: ActuatorId::Device,
        raw: 7,
    }));
}

#[test]
fn read_failure_is_reported_not_treated_as_command() {
    let mut h = Harness::started();
    h.store.remote_set("light/control", 1);
    h.store.fail_reads = true;

    h.poll(500);

    assert!(!h.engaged(ActuatorId::Light));
    assert_eq!(h.svc.mode(ActuatorId::Light), Mode::Auto);
    assert_eq!(
        h.sink.count(|e| matches!(
            e,
            AppEvent::StoreFailure { op: StoreOp::Read, error: StoreError::Transport }
        )),
        3
    );
}

#[test]
fn failed_acknowledgement_still_applies_command() {
    let mut h = Harness::started();
    h.store.remote_set("light/control", 1);
    h.store.fail_writes = true;

    h.poll(500);

    assert!(h.engaged(ActuatorId::Light));
    assert!(h.hw.relay_on(ActuatorId::Light));
    assert!(!h
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::CommandAcknowledged { .. })));
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::StoreFailure { op: StoreOp::Write, .. })),
        2,
        "status echo and acknowledgement both failed"
    );
}

// ── Humidity rule ─────────────────────────────────────────────

#[test]
fn pump_follows_threshold_without_hysteresis() {
    let mut h = Harness::started();

    h.hw.humidity = SensorReading::from_raw(39.9);
    h.tick(0);
    assert!(h.engaged(ActuatorId::Pump));
    assert_eq!(h.hw.servo_angle(), Some(90));

    h.hw.humidity = SensorReading::from_raw(40.0);
    h.tick(500);
    assert!(!h.engaged(ActuatorId::Pump));
    assert_eq!(h.hw.servo_angle(), Some(0));

    h.tick(1_000);
    assert_eq!(
        h.store.writes_to("pump/status"),
        vec![Written::Int(1), Written::Int(0)]
    );
}

#[test]
fn invalid_humidity_leaves_pump_alone() {
    let mut h = Harness::started();
    h.hw.humidity = SensorReading::from_raw(20.0);
    h.tick(0);
    assert!(h.engaged(ActuatorId::Pump));

    h.hw.humidity = SensorReading::INVALID;
    h.tick(500);

    assert!(h.engaged(ActuatorId::Pump));
    assert!(h
        .sink
        .events
        .contains(&AppEvent::SensorInvalid(SensorKind::Humidity)));
}

#[test]
fn reversion_leaves_control_field_alone() {
    let mut h = Harness::started();
    h.store.remote_set("device/control", 1);
    h.poll(0);
    assert_eq!(h.store.writes_to("device/control"), vec![Written::Int(-1)]);

    h.tick(10_001);
    assert_eq!(h.svc.mode(ActuatorId::Device), Mode::Auto);
    assert_eq!(h.store.writes_to("device/control"), vec![Written::Int(-1)]);
}

#[test]
fn manual_pump_reverts_to_humidity_rule() {
    let mut h = Harness::started();
    h.store.remote_set("pump/control", 1);
    h.poll(0);
    assert_eq!(h.hw.servo_angle(), Some(90));

    h.tick(10_000);
    assert!(h.engaged(ActuatorId::Pump), "55 %RH ignored while MANUAL");

    h.tick(10_001);
    assert_eq!(h.svc.mode(ActuatorId::Pump), Mode::Auto);
    assert!(!h.engaged(ActuatorId::Pump));
    assert_eq!(h.hw.servo_angle(), Some(0));
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_publishes_valid_readings() {
    let mut h = Harness::started();

    h.telemetry();

    assert_eq!(
        h.store.writes,
        vec![
            (path("sensors/temperature"), Written::Float(22.5)),
            (path("sensors/humidity"), Written::Float(55.0)),
        ]
    );
    assert!(matches!(h.sink.events.last(), Some(AppEvent::Telemetry(_))));
}

#[test]
fn telemetry_skips_invalid_readings() {
    let mut h = Harness::started();
    h.hw.temperature = SensorReading::INVALID;

    h.telemetry();

    assert!(h.store.writes_to("sensors/temperature").is_empty());
    assert_eq!(h.store.writes_to("sensors/humidity"), vec![Written::Float(55.0)]);
    assert!(h
        .sink
        .events
        .contains(&AppEvent::SensorInvalid(SensorKind::Temperature)));

    let t = h.svc.build_telemetry();
    assert!(!t.temperature.valid);
    assert_eq!(t.humidity.get(), Some(55.0));
}
