//! System configuration parameters
//!
//! All tunable parameters for the room controller.
//! Values can be overridden via NVS (non-volatile storage); everything
//! else derived from them (store paths, credentials) is built once at
//! startup and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Capacity of the device root path, e.g. `/iot_devices/esp32_lab4`.
pub const DEVICE_ROOT_CAPACITY: usize = 40;
/// Capacity of a motion-zone name, e.g. `room`.
pub const ZONE_NAME_CAPACITY: usize = 12;

/// Most remote store calls made between two watchdog feeds.
///
/// Intake for one output makes at most three calls and a reconcile pass
/// at most five: status and motion flag for each relay plus pump status.
pub const MAX_STORE_CALLS_BETWEEN_FEEDS: u32 = 5;

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerConfig {
    // --- Remote store layout ---
    /// Root of this device's subtree in the remote store.
    pub device_root: heapless::String<DEVICE_ROOT_CAPACITY>,
    /// Motion-flag key for the light's PIR zone (`motion/<zone>`).
    pub light_zone: heapless::String<ZONE_NAME_CAPACITY>,
    /// Motion-flag key for the device relay's PIR zone.
    pub device_zone: heapless::String<ZONE_NAME_CAPACITY>,

    // --- Cadences ---
    /// Remote command poll interval (milliseconds)
    pub command_poll_interval_ms: u32,
    /// Temperature/humidity push interval (milliseconds)
    pub telemetry_interval_ms: u32,
    /// Fixed sleep between control loop iterations (milliseconds)
    pub loop_delay_ms: u32,

    // --- Reconciliation timing ---
    /// No motion for this long switches a motion-driven output off
    pub motion_timeout_ms: u32,
    /// A manual override reverts to automatic control after this long
    pub manual_timeout_ms: u32,

    // --- Pump ---
    /// Relative humidity (%RH) below which the pump runs
    pub humidity_threshold_pct: f32,
    /// Servo angle (degrees) for pump on
    pub pump_on_angle: u8,
    /// Servo angle (degrees) for pump off
    pub pump_off_angle: u8,

    // --- Platform ---
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
    /// Upper bound on one remote store request (milliseconds)
    pub store_timeout_ms: u32,
    /// WiFi station SSID
    pub wifi_ssid: heapless::String<32>,
    /// WiFi station password (empty = open network)
    pub wifi_password: heapless::String<64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Store layout
            device_root: fixed("/iot_devices/esp32_lab4"),
            light_zone: fixed("room"),
            device_zone: fixed("dorm"),

            // Cadences
            command_poll_interval_ms: 1000, // 1 Hz
            telemetry_interval_ms: 3500,
            loop_delay_ms: 500,

            // Reconciliation
            motion_timeout_ms: 5_000,
            manual_timeout_ms: 10_000,

            // Pump
            humidity_threshold_pct: 40.0,
            pump_on_angle: 90,
            pump_off_angle: 0,

            // Platform
            watchdog_timeout_ms: 30_000,
            store_timeout_ms: 5_000,
            wifi_ssid: fixed("Wokwi-GUEST"),
            wifi_password: heapless::String::new(),
        }
    }
}

impl ControllerConfig {
    /// Range-check every field.
    ///
    /// Invalid values are rejected, not clamped, so a corrupted NVS blob
    /// can never produce a controller that polls in a hot loop or never
    /// reverts a manual override.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.device_root.starts_with('/') || self.device_root.ends_with('/') {
            return Err("device_root must start with '/' and not end with '/'");
        }
        if !is_path_segment(&self.light_zone) || !is_path_segment(&self.device_zone) {
            return Err("motion zone names must be non-empty and contain no '/'");
        }
        if !(100..=60_000).contains(&self.command_poll_interval_ms) {
            return Err("command_poll_interval_ms must be 100–60000");
        }
        if !(500..=600_000).contains(&self.telemetry_interval_ms) {
            return Err("telemetry_interval_ms must be 500–600000");
        }
        if !(10..=5_000).contains(&self.loop_delay_ms) {
            return Err("loop_delay_ms must be 10–5000");
        }
        if !(1_000..=3_600_000).contains(&self.motion_timeout_ms) {
            return Err("motion_timeout_ms must be 1000–3600000");
        }
        if !(1_000..=3_600_000).contains(&self.manual_timeout_ms) {
            return Err("manual_timeout_ms must be 1000–3600000");
        }
        if !(0.0..=100.0).contains(&self.humidity_threshold_pct) {
            return Err("humidity_threshold_pct must be 0.0–100.0");
        }
        if self.pump_on_angle > 180 || self.pump_off_angle > 180 {
            return Err("pump servo angles must be 0–180");
        }
        if self.pump_on_angle == self.pump_off_angle {
            return Err("pump on/off angles must differ");
        }
        if self.watchdog_timeout_ms <= self.loop_delay_ms {
            return Err("watchdog_timeout_ms must exceed loop_delay_ms");
        }
        if !(500..=30_000).contains(&self.store_timeout_ms) {
            return Err("store_timeout_ms must be 500–30000");
        }
        if self.watchdog_timeout_ms <= MAX_STORE_CALLS_BETWEEN_FEEDS * self.store_timeout_ms {
            return Err("watchdog_timeout_ms must exceed the store calls made between feeds");
        }
        if self.wifi_ssid.is_empty() {
            return Err("wifi_ssid must not be empty");
        }
        Ok(())
    }
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty() && !s.contains('/')
}

/// Build a fixed-capacity string from a literal known to fit.
fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
