//! Data threaded through every reconciler evaluation.
//!
//! [`SensorSnapshot`] is captured once per tick by the service and handed
//! to each reconciler read-only.  [`ActuatorState`] is the per-actuator
//! state a reconciler owns exclusively.

use crate::app::ports::{MotionSensor, SensorPort};

use super::Mode;

// ---------------------------------------------------------------------------
// Sensor reading
// ---------------------------------------------------------------------------

/// A numeric sensor value plus its validity.
///
/// Invalid readings carry `NaN` and must never reach the remote store or
/// drive an output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub value: f32,
    pub valid: bool,
}

impl SensorReading {
    pub const INVALID: Self = Self {
        value: f32::NAN,
        valid: false,
    };

    /// Wrap a raw driver value; NaN and infinities are invalid.
    pub fn from_raw(value: f32) -> Self {
        if value.is_finite() {
            Self { value, valid: true }
        } else {
            Self::INVALID
        }
    }

    /// The value, if valid.
    pub fn get(self) -> Option<f32> {
        self.valid.then_some(self.value)
    }
}

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to reconcilers)
// ---------------------------------------------------------------------------

/// Instantaneous sensor state for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub room_motion: bool,
    pub dorm_motion: bool,
    pub humidity: SensorReading,
}

impl SensorSnapshot {
    pub fn capture(sensors: &mut impl SensorPort) -> Self {
        Self {
            room_motion: sensors.read_motion(MotionSensor::Room),
            dorm_motion: sensors.read_motion(MotionSensor::Dorm),
            humidity: sensors.read_humidity(),
        }
    }

    pub fn motion(&self, sensor: MotionSensor) -> bool {
        match sensor {
            MotionSensor::Room => self.room_motion,
            MotionSensor::Dorm => self.dorm_motion,
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator state (owned by one reconciler)
// ---------------------------------------------------------------------------

/// Process-lifetime state of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    /// Current physical on/off state.
    pub engaged: bool,
    /// Governing policy; `Manual` carries the entry timestamp.
    pub mode: Mode,
    /// Last time the autonomous trigger (motion) was observed.
    pub last_trigger_at: u32,
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self {
            engaged: false,
            mode: Mode::Auto,
            last_trigger_at: 0,
        }
    }
}
