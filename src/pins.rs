//! GPIO / peripheral pin assignments for the room controller board.
//!
//! Single source of truth for pin numbers; `main` takes the matching
//! `peripherals.pins.gpioN` for each of these.

// ---------------------------------------------------------------------------
// Motion sensors (HC-SR501 PIR, HIGH = motion)
// ---------------------------------------------------------------------------

/// PIR covering the room; drives the light relay.
pub const PIR_ROOM_GPIO: i32 = 27;
/// PIR covering the dorm; drives the device relay.
pub const PIR_DORM_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Relays (active HIGH)
// ---------------------------------------------------------------------------

pub const RELAY_LIGHT_GPIO: i32 = 14;
pub const RELAY_DEVICE_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Pump servo
// ---------------------------------------------------------------------------

/// LEDC output for the pump valve servo.
pub const SERVO_GPIO: i32 = 13;
/// LEDC timer resolution (bits).  14-bit gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

// ---------------------------------------------------------------------------
// Climate sensor
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open drain, external pull-up).
pub const DHT_GPIO: i32 = 21;
