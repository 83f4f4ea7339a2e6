//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControllerService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, remote store, event sinks, config
//! storage) implement these traits.  The
//! [`ControllerService`](super::service::ControllerService) consumes them via
//! generics, so the domain core never touches hardware or the network
//! directly.

use crate::config::ControllerConfig;
use crate::error::StoreError;
use crate::reconciler::context::SensorReading;

// ───────────────────────────────────────────────────────────────
// Identities shared across ports
// ───────────────────────────────────────────────────────────────

/// The three outputs the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorId {
    /// Light relay, motion-driven (room PIR).
    Light,
    /// Generic device relay, motion-driven (dorm PIR).
    Device,
    /// Water-pump servo, humidity-driven.
    Pump,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 3] = [Self::Light, Self::Device, Self::Pump];

    /// Key of this actuator's subtree in the remote store.
    pub fn key(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Device => "device",
            Self::Pump => "pump",
        }
    }
}

/// The two passive-infrared motion sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionSensor {
    Room,
    Dorm,
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Instantaneous motion state of one PIR sensor.
    fn read_motion(&mut self, sensor: MotionSensor) -> bool;

    /// Ambient temperature (°C); invalid when the sensor failed.
    fn read_temperature(&mut self) -> SensorReading;

    /// Relative humidity (%RH); invalid when the sensor failed.
    fn read_humidity(&mut self) -> SensorReading;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: a pure command sink with no read-back.
pub trait ActuatorPort {
    /// Drive a relay output on or off.
    fn set_digital_output(&mut self, actuator: ActuatorId, on: bool);

    /// Move the pump servo to `angle` degrees.
    fn set_servo_position(&mut self, angle: u8);
}

// ───────────────────────────────────────────────────────────────
// Remote store port (driven adapter: domain ↔ cloud key/value store)
// ───────────────────────────────────────────────────────────────

/// Hierarchical key/value store polled for commands and written with
/// status and telemetry.
///
/// Calls are blocking.  A read of a key that holds no value returns
/// `Ok(None)`; only transport or protocol failures return `Err`.
pub trait RemoteStorePort {
    fn get_int(&mut self, path: &str) -> Result<Option<i32>, StoreError>;

    fn set_int(&mut self, path: &str, value: i32) -> Result<(), StoreError>;

    fn set_float(&mut self, path: &str, value: f32) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond uptime.  Wraps at `u32::MAX` (~49.7 days);
/// every consumer compares timestamps with that in mind.
pub trait TimePort {
    fn now_ms(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST call [`ControllerConfig::validate`] before
/// persisting and reject invalid values instead of clamping them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ControllerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a cadence is due.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) only keeps time; the
/// control loop implements this to run command intake or telemetry.
pub trait SchedulerDelegate {
    fn on_cadence_due(&mut self, kind: CadenceKind, now_ms: u32);
}

/// Discriminant passed to [`SchedulerDelegate::on_cadence_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceKind {
    /// Poll every actuator's remote command field.
    CommandPoll,
    /// Push temperature and humidity to the remote store.
    Telemetry,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
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
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
