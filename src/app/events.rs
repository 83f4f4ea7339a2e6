//! Outbound application events.
//!
//! The [`ControllerService`](super::service::ControllerService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them.

use crate::app::commands::PendingCommand;
use crate::app::ports::ActuatorId;
use crate::error::StoreError;
use crate::reconciler::Mode;
use crate::reconciler::context::SensorReading;

/// Which policy produced an output change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSource {
    /// Sensor-driven rule (motion or humidity).
    Auto,
    /// Remote command.
    Manual,
    /// Power-on initialisation.
    Startup,
}

/// Sensor channels that can report an invalid reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Humidity,
}

/// Direction of a failed remote store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Outputs driven off and initial status published.
    Started,

    /// An actuator's `engaged` state changed.
    OutputChanged {
        actuator: ActuatorId,
        engaged: bool,
        source: ControlSource,
    },

    /// An actuator switched between AUTO and MANUAL.
    ModeChanged {
        actuator: ActuatorId,
        from: Mode,
        to: Mode,
    },

    /// A remote command was consumed and its field reset to `-1`.
    CommandAcknowledged {
        actuator: ActuatorId,
        command: PendingCommand,
    },

    /// A `control` value outside `{-1, 0, 1}` was seen and left untouched.
    CommandIgnored { actuator: ActuatorId, raw: i32 },

    /// A sensor reported NaN; the dependent evaluation or write was skipped.
    SensorInvalid(SensorKind),

    /// A remote store call failed.
    StoreFailure { op: StoreOp, error: StoreError },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub temperature: SensorReading,
    pub humidity: SensorReading,
    pub light: OutputSnapshot,
    pub device: OutputSnapshot,
    pub pump: OutputSnapshot,
}

/// One actuator's externally visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSnapshot {
    pub engaged: bool,
    pub mode: Mode,
}
