//! Mock adapters for integration tests.
//!
//! Records every actuator call, store write and domain event so tests can
//! assert on the full history without touching GPIO or the network.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use roomctl::app::events::AppEvent;
use roomctl::app::ports::{ActuatorId, ActuatorPort, EventSink, MotionSensor, RemoteStorePort, SensorPort};
use roomctl::error::StoreError;
use roomctl::reconciler::context::SensorReading;

pub const ROOT: &str = "/iot_devices/esp32_lab4";

pub fn path(suffix: &str) -> String {
    format!("{ROOT}/{suffix}")
}

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Relay { actuator: ActuatorId, on: bool },
    Servo { angle: u8 },
}

// ── MockHw ────────────────────────────────────────────────────

pub struct MockHw {
    pub room_motion: bool,
    pub dorm_motion: bool,
    pub temperature: SensorReading,
    pub humidity: SensorReading,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHw {
    /// No motion, 22.5 °C, 55 %RH (pump stays off).
    pub fn new() -> Self {
        Self {
            room_motion: false,
            dorm_motion: false,
            temperature: SensorReading::from_raw(22.5),
            humidity: SensorReading::from_raw(55.0),
            calls: Vec::new(),
        }
    }

    pub fn relay_on(&self, actuator: ActuatorId) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match *c {
                ActuatorCall::Relay { actuator: a, on } if a == actuator => Some(on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match *c {
            ActuatorCall::Servo { angle } => Some(angle),
            ActuatorCall::Relay { .. } => None,
        })
    }
}

impl SensorPort for MockHw {
    fn read_motion(&mut self, sensor: MotionSensor) -> bool {
        match sensor {
            MotionSensor::Room => self.room_motion,
            MotionSensor::Dorm => self.dorm_motion,
        }
    }

    fn read_temperature(&mut self) -> SensorReading {
        self.temperature
    }

    fn read_humidity(&mut self) -> SensorReading {
        self.humidity
    }
}

impl ActuatorPort for MockHw {
    fn set_digital_output(&mut self, actuator: ActuatorId, on: bool) {
        self.calls.push(ActuatorCall::Relay { actuator, on });
    }

    fn set_servo_position(&mut self, angle: u8) {
        self.calls.push(ActuatorCall::Servo { angle });
    }
}

// ── MockStore ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Written {
    Int(i32),
    Float(f32),
}

#[derive(Default)]
pub struct MockStore {
    pub ints: HashMap<String, i32>,
    pub writes: Vec<(String, Written)>,
    pub reads: u32,
    /// Every request, failed or not; shared so a test can watch it mid-run.
    pub requests: Rc<Cell<u32>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a value in the store as if written by a remote client.
    pub fn remote_set(&mut self, suffix: &str, value: i32) {
        self.ints.insert(path(suffix), value);
    }

    pub fn int(&self, suffix: &str) -> Option<i32> {
        self.ints.get(&path(suffix)).copied()
    }

    pub fn writes_to(&self, suffix: &str) -> Vec<Written> {
        let full = path(suffix);
        self.writes
            .iter()
            .filter(|(p, _)| *p == full)
            .map(|(_, w)| w.clone())
            .collect()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl RemoteStorePort for MockStore {
    fn get_int(&mut self, path: &str) -> Result<Option<i32>, StoreError> {
        self.reads += 1;
        self.requests.set(self.requests.get() + 1);
        if self.fail_reads {
            return Err(StoreError::Transport);
        }
        Ok(self.ints.get(path).copied())
    }

    fn set_int(&mut self, path: &str, value: i32) -> Result<(), StoreError> {
        self.requests.set(self.requests.get() + 1);
        if self.fail_writes {
            return Err(StoreError::Http(503));
        }
        self.ints.insert(path.to_string(), value);
        self.writes.push((path.to_string(), Written::Int(value)));
        Ok(())
    }

    fn set_float(&mut self, path: &str, value: f32) -> Result<(), StoreError> {
        self.requests.set(self.requests.get() + 1);
        if self.fail_writes {
            return Err(StoreError::Http(503));
        }
        self.writes.push((path.to_string(), Written::Float(value)));
        Ok(())
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

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
