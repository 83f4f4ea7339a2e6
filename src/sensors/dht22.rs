//! DHT22 (AM2302) temperature / humidity sensor.
//!
//! Single-wire protocol, bit-banged on an open-drain pin with an external
//! pull-up:
//!
//! ```text
//!  host  ‾‾‾\____ ≥1 ms ____/‾‾ 30 µs ‾‾\
//!  dht                                  \__ 80 µs __/‾‾ 80 µs ‾‾\
//!  bit   \__ 50 µs __/‾‾ 26 µs (0) | 70 µs (1) ‾‾\   × 40
//! ```
//!
//! The frame is 16 bits humidity ×10, 16 bits temperature ×10 (bit 15 =
//! sign), then an 8-bit checksum.  The part must not be sampled more than
//! once every two seconds; in between the last result is returned,
//! including the last failure.
//!
//! ## Dual-target design
//!
//! The driver is generic over `embedded-hal` traits.  On ESP-IDF it runs
//! on a `PinDriver` in input/output open-drain mode with `Ets` delays; on
//! host it runs against a scripted line in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::TimePort;
use crate::error::SensorError;

use super::{ClimateSensor, Measurement};

/// Minimum time between two bus transactions.
pub const MIN_SAMPLE_INTERVAL_MS: u32 = 2_000;

const START_LOW_US: u32 = 1_100;
const RELEASE_US: u32 = 30;
/// Longest any single level may last before the read is abandoned.
const LEVEL_TIMEOUT_US: u32 = 100;
/// High pulses longer than this are `1` bits.
const BIT_THRESHOLD_US: u32 = 40;

/// Decode a raw 5-byte frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<Measurement, SensorError> {
    let sum = frame[..4]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let temperature = f32::from(magnitude) / 10.0;

    Ok(Measurement {
        temperature_c: if frame[2] & 0x80 != 0 {
            -temperature
        } else {
            temperature
        },
        humidity_pct: f32::from(humidity) / 10.0,
    })
}

pub struct Dht22<P, D, T> {
    pin: P,
    delay: D,
    clock: T,
    last_sample_at: Option<u32>,
    last: Result<Measurement, SensorError>,
}

impl<P, D, T> Dht22<P, D, T>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    T: TimePort,
{
    pub fn new(mut pin: P, delay: D, clock: T) -> Self {
        // Idle state is the released (pulled-up) line.
        if pin.set_high().is_err() {
            warn!("DHT22: failed to release data line");
        }
        Self {
            pin,
            delay,
            clock,
            last_sample_at: None,
            last: Err(SensorError::Timeout),
        }
    }

    /// Latest measurement, sampling the bus only when the cached one is
    /// older than [`MIN_SAMPLE_INTERVAL_MS`].
    pub fn measure(&mut self) -> Result<Measurement, SensorError> {
        let now = self.clock.now_ms();
        let fresh = self
            .last_sample_at
            .is_some_and(|at| now.wrapping_sub(at) < MIN_SAMPLE_INTERVAL_MS);
        if !fresh {
            self.last = self.read_frame().and_then(decode_frame);
            self.last_sample_at = Some(now);
            if let Err(e) = self.last {
                warn!("DHT22: {}", e);
            }
        }
        self.last
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioReadFailed)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::GpioReadFailed)?;
        self.delay.delay_us(RELEASE_US);

        // Response: low 80 µs, high 80 µs, then the first bit's low phase.
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_for(true)?;
            let high_us = self.wait_for(false)?;
            if high_us > BIT_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Busy-wait until the line reads `level`; returns the wait in µs.
    fn wait_for(&mut self, level: bool) -> Result<u32, SensorError> {
        for elapsed in 0..=LEVEL_TIMEOUT_US {
            let high = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
            if high == level {
                return Ok(elapsed);
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

impl<P, D, T> ClimateSensor for Dht22<P, D, T>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    T: TimePort,
{
    fn measure(&mut self) -> Result<Measurement, SensorError> {
        Dht22::measure(self)
    }
}
