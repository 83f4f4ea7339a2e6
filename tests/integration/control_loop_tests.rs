//! End-to-end tests for the control loop: scheduler cadences, command
//! polling, telemetry and reconciliation running together on a simulated
//! clock stepped in loop-delay increments.

use crate::mock_hw::{MockHw, MockStore, RecordingSink, Written};

use roomctl::app::ports::ActuatorId;
use roomctl::reconciler::context::SensorReading;
use roomctl::config::{ControllerConfig, MAX_STORE_CALLS_BETWEEN_FEEDS};
use roomctl::reconciler::Mode;
use roomctl::runtime::ControlLoop;

type Loop = ControlLoop<MockHw, MockStore, RecordingSink>;

const STEP_MS: u32 = 500;

fn started_at(now: u32) -> Loop {
    let mut control = ControlLoop::new(
        &ControllerConfig::default(),
        MockHw::new(),
        MockStore::new(),
        RecordingSink::new(),
    )
    .unwrap();
    control.start(now);
    control
}

fn run_until(control: &mut Loop, from: u32, to: u32) {
    let mut t = from;
    while t <= to {
        control.run_once(t);
        t += STEP_MS;
    }
}

#[test]
fn rejects_invalid_config() {
    let config = ControllerConfig {
        command_poll_interval_ms: 0,
        ..ControllerConfig::default()
    };
    assert!(ControlLoop::new(&config, MockHw::new(), MockStore::new(), RecordingSink::new()).is_err());
}

#[test]
fn startup_publishes_zero_status_for_every_output() {
    let control = started_at(0);
    for id in ActuatorId::ALL {
        assert_eq!(control.store().int(&format!("{}/status", id.key())), Some(0));
        assert_eq!(control.service().mode(id), Mode::Auto);
    }
}

#[test]
fn motion_light_scenario() {
    let mut control = started_at(0);
    control.hw_mut().room_motion = true;
    control.run_once(0);

    assert!(control.service().state(ActuatorId::Light).engaged);
    assert_eq!(control.store().int("light/status"), Some(1));
    assert_eq!(control.store().int("motion/room"), Some(1));

    control.hw_mut().room_motion = false;
    run_until(&mut control, STEP_MS, 5_000);
    assert!(control.service().state(ActuatorId::Light).engaged);

    control.run_once(5_500);
    assert!(!control.service().state(ActuatorId::Light).engaged);
    assert!(!control.hw().relay_on(ActuatorId::Light));
    assert_eq!(control.store().int("light/status"), Some(0));
}

#[test]
fn remote_device_command_scenario() {
    let mut control = started_at(0);
    control.store_mut().remote_set("device/control", 1);

    // First poll is one interval after start.
    control.run_once(500);
    assert!(!control.service().state(ActuatorId::Device).engaged);
    control.run_once(1_000);

    assert!(control.service().state(ActuatorId::Device).engaged);
    assert_eq!(
        control.service().mode(ActuatorId::Device),
        Mode::Manual { entered_at: 1_000 }
    );
    assert_eq!(control.store().int("device/control"), Some(-1));
    assert_eq!(control.store().int("device/status"), Some(1));

    // Dorm PIR never fires; MANUAL holds the relay on.
    run_until(&mut control, 1_500, 11_000);
    assert!(control.service().state(ActuatorId::Device).engaged);
    assert!(control.service().mode(ActuatorId::Device).is_manual());

    // Reversion, then the motion rule sees a stale trigger and releases.
    control.run_once(11_500);
    assert_eq!(control.service().mode(ActuatorId::Device), Mode::Auto);
    assert!(!control.service().state(ActuatorId::Device).engaged);
    assert_eq!(control.store().int("device/status"), Some(0));
}

#[test]
fn cadences_fire_on_their_intervals() {
    let mut control = started_at(0);

    run_until(&mut control, 0, 3_000);
    // Polls at 1000, 2000 and 3000, three fields each.
    assert_eq!(control.store().reads, 9);
    assert!(control.store().writes_to("sensors/temperature").is_empty());

    control.run_once(3_500);
    assert_eq!(
        control.store().writes_to("sensors/temperature"),
        vec![Written::Float(22.5)]
    );
    assert_eq!(control.service().tick_count(), 8);
}

#[test]
fn store_outage_does_not_stop_local_control() {
    let mut control = started_at(0);
    control.store_mut().fail_reads = true;
    control.store_mut().fail_writes = true;
    control.hw_mut().room_motion = true;

    run_until(&mut control, 0, 4_000);

    assert!(control.service().state(ActuatorId::Light).engaged);
    assert!(control.hw().relay_on(ActuatorId::Light));
}

/// Store requests made before each feed of one iteration.
fn requests_per_feed(control: &mut Loop, now: u32) -> Vec<u32> {
    let requests = control.store().requests.clone();
    let mut marks = vec![requests.get()];
    control.run_once_feeding(now, &mut || marks.push(requests.get()));
    marks.windows(2).map(|w| w[1] - w[0]).collect()
}

#[test]
fn watchdog_is_fed_after_each_blocking_stage() {
    let mut control = started_at(0);
    for id in ActuatorId::ALL {
        control.store_mut().remote_set(&format!("{}/control", id.key()), 1);
    }

    // Poll and telemetry both due: one feed per output's intake (read,
    // status, ack), one after telemetry, one after reconcile.
    let gaps = requests_per_feed(&mut control, 3_500);
    assert_eq!(gaps, vec![3, 3, 3, 2, 0]);
}

#[test]
fn reconcile_stays_within_store_calls_between_feeds() {
    let mut control = started_at(0);
    control.hw_mut().room_motion = true;
    control.hw_mut().dorm_motion = true;
    control.hw_mut().humidity = SensorReading::from_raw(20.0);

    // No cadence due: both relays raise status and motion flag, pump status.
    let gaps = requests_per_feed(&mut control, 500);
    assert_eq!(gaps, vec![MAX_STORE_CALLS_BETWEEN_FEEDS]);
}
