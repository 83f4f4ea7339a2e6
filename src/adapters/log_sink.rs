//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::{AppEvent, OutputSnapshot};
use crate::app::ports::EventSink;
use crate::reconciler::Mode;
use crate::reconciler::context::SensorReading;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={}\u{00b0}C RH={}% | light={} device={} pump={}",
                    Reading(t.temperature),
                    Reading(t.humidity),
                    Output(t.light),
                    Output(t.device),
                    Output(t.pump),
                );
            }
            AppEvent::OutputChanged {
                actuator,
                engaged,
                source,
            } => {
                info!(
                    "CTRL | {} engaged={} source={:?}",
                    actuator.key(),
                    engaged,
                    source
                );
            }
            AppEvent::ModeChanged { actuator, to, .. } => {
                info!("MODE | {} -> {}", actuator.key(), mode_label(*to));
            }
            AppEvent::CommandAcknowledged { actuator, command } => {
                info!("CMD  | {} {:?} acknowledged", actuator.key(), command);
            }
            AppEvent::CommandIgnored { actuator, raw } => {
                warn!("CMD  | {} ignored unknown value {}", actuator.key(), raw);
            }
            AppEvent::SensorInvalid(kind) => {
                warn!("SENS | {:?} reading invalid", kind);
            }
            AppEvent::StoreFailure { op, error } => {
                warn!("STORE | {:?} failed: {}", op, error);
            }
            AppEvent::Started => {
                info!("START | outputs off, status published");
            }
        }
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Auto => "AUTO",
        Mode::Manual { .. } => "MANUAL",
    }
}

struct Reading(SensorReading);

impl core::fmt::Display for Reading {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0.get() {
            Some(v) => write!(f, "{v:.1}"),
            None => f.write_str("--"),
        }
    }
}

struct Output(OutputSnapshot);

impl core::fmt::Display for Output {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = if self.0.engaged { "ON" } else { "OFF" };
        write!(f, "{}/{}", state, mode_label(self.0.mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_invalid_reading_as_dashes() {
        assert_eq!(Reading(SensorReading::INVALID).to_string(), "--");
        assert_eq!(Reading(SensorReading::from_raw(21.26)).to_string(), "21.3");
    }

    #[test]
    fn renders_output_state_and_mode() {
        let out = Output(OutputSnapshot {
            engaged: true,
            mode: Mode::Manual { entered_at: 5 },
        });
        assert_eq!(out.to_string(), "ON/MANUAL");
    }
}
