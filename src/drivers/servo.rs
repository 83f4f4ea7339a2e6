//! Hobby servo on a 50 Hz PWM channel (pump valve).
//!
//! The pulse width maps linearly from 500 µs at 0° to 2500 µs at 180°.
//! The duty cycle is written as a fraction of the 20 ms period, so the
//! driver is independent of the timer resolution behind the channel.

use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

/// PWM frequency the channel must be configured for.
pub const SERVO_FREQ_HZ: u32 = 50;
/// Period at [`SERVO_FREQ_HZ`].
pub const PERIOD_US: u16 = 20_000;
pub const MIN_PULSE_US: u16 = 500;
pub const MAX_PULSE_US: u16 = 2_500;
pub const MAX_ANGLE: u8 = 180;

/// Pulse width for `angle`, clamped to 0–180°.
pub fn pulse_us(angle: u8) -> u16 {
    let angle = u32::from(angle.min(MAX_ANGLE));
    let span = u32::from(MAX_PULSE_US - MIN_PULSE_US);
    MIN_PULSE_US + (angle * span / u32::from(MAX_ANGLE)) as u16
}

pub struct ServoDriver<P> {
    channel: P,
    angle: Option<u8>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(channel: P) -> Self {
        Self {
            channel,
            angle: None,
        }
    }

    pub fn set_angle(&mut self, angle: u8) -> Result<(), ActuatorError> {
        let angle = angle.min(MAX_ANGLE);
        self.channel
            .set_duty_cycle_fraction(pulse_us(angle), PERIOD_US)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.angle = Some(angle);
        Ok(())
    }

    /// Last angle successfully commanded, `None` before the first write.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
