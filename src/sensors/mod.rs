//! Sensor subsystem: PIR motion inputs and the DHT22 climate sensor.

pub mod dht22;
pub mod motion;

use crate::error::SensorError;

/// One temperature / humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// A combined temperature / humidity source.
///
/// Implementations own any rate limiting; callers may ask as often as
/// they like.
pub trait ClimateSensor {
    fn measure(&mut self) -> Result<Measurement, SensorError>;
}
