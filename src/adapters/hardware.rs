//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns both PIR inputs, the climate sensor, both relays and the pump
//! servo, exposing them through [`SensorPort`] and [`ActuatorPort`].
//! Driver failures are logged here; the domain only ever sees a reading
//! (possibly invalid) or a fire-and-forget command.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ActuatorId, ActuatorPort, MotionSensor, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::drivers::servo::ServoDriver;
use crate::reconciler::context::SensorReading;
use crate::sensors::motion::PirSensor;
use crate::sensors::ClimateSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<O, I, S, C> {
    light: RelayDriver<O>,
    device: RelayDriver<O>,
    pump: ServoDriver<S>,
    pir_room: PirSensor<I>,
    pir_dorm: PirSensor<I>,
    climate: C,
}

impl<O, I, S, C> HardwareAdapter<O, I, S, C>
where
    O: OutputPin,
    I: InputPin,
    S: SetDutyCycle,
    C: ClimateSensor,
{
    pub fn new(
        light: RelayDriver<O>,
        device: RelayDriver<O>,
        pump: ServoDriver<S>,
        pir_room: PirSensor<I>,
        pir_dorm: PirSensor<I>,
        climate: C,
    ) -> Self {
        Self {
            light,
            device,
            pump,
            pir_room,
            pir_dorm,
            climate,
        }
    }

    fn relay(&mut self, actuator: ActuatorId) -> Option<&mut RelayDriver<O>> {
        match actuator {
            ActuatorId::Light => Some(&mut self.light),
            ActuatorId::Device => Some(&mut self.device),
            ActuatorId::Pump => None,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<O, I, S, C> SensorPort for HardwareAdapter<O, I, S, C>
where
    O: OutputPin,
    I: InputPin,
    S: SetDutyCycle,
    C: ClimateSensor,
{
    fn read_motion(&mut self, sensor: MotionSensor) -> bool {
        match sensor {
            MotionSensor::Room => self.pir_room.read(),
            MotionSensor::Dorm => self.pir_dorm.read(),
        }
    }

    fn read_temperature(&mut self) -> SensorReading {
        self.climate
            .measure()
            .map_or(SensorReading::INVALID, |m| SensorReading::from_raw(m.temperature_c))
    }

    fn read_humidity(&mut self) -> SensorReading {
        self.climate
            .measure()
            .map_or(SensorReading::INVALID, |m| SensorReading::from_raw(m.humidity_pct))
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<O, I, S, C> ActuatorPort for HardwareAdapter<O, I, S, C>
where
    O: OutputPin,
    I: InputPin,
    S: SetDutyCycle,
    C: ClimateSensor,
{
    fn set_digital_output(&mut self, actuator: ActuatorId, on: bool) {
        let Some(relay) = self.relay(actuator) else {
            warn!("{} has no relay output", actuator.key());
            return;
        };
        if let Err(e) = relay.set(on) {
            warn!("{} relay: {}", actuator.key(), e);
        }
    }

    fn set_servo_position(&mut self, angle: u8) {
        if let Err(e) = self.pump.set_angle(angle) {
            warn!("pump servo: {}", e);
        }
    }
}
