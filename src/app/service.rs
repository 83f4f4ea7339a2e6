//! Controller service: the hexagonal core.
//!
//! [`ControllerService`] owns one [`ActuatorReconciler`] per output and
//! the resolved store layout.  All I/O flows through port traits injected
//! at call sites, so the whole service runs against mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │      ControllerService       │
//! ActuatorPort ◀──│  light · device · pump       │◀─▶ RemoteStorePort
//!                 └─────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::ControllerConfig;
use crate::error::{Error, Result};
use crate::reconciler::context::{ActuatorState, SensorReading, SensorSnapshot};
use crate::reconciler::{ActuatorReconciler, Drive, Mode, Timeouts, Trigger};

use super::events::{AppEvent, OutputSnapshot, SensorKind, StoreOp, TelemetryData};
use super::paths::StorePaths;
use super::ports::{ActuatorId, ActuatorPort, EventSink, MotionSensor, RemoteStorePort, SensorPort};

// ───────────────────────────────────────────────────────────────
// ControllerService
// ───────────────────────────────────────────────────────────────

/// Orchestrates the three reconcilers and telemetry.
pub struct ControllerService {
    /// Indexed by `ActuatorId as usize`.
    reconcilers: [ActuatorReconciler; 3],
    paths: StorePaths,
    last_temperature: SensorReading,
    last_humidity: SensorReading,
    tick_count: u64,
}

impl ControllerService {
    /// Validate `config` and resolve the store layout.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: &ControllerConfig) -> Result<Self> {
        config.validate().map_err(Error::Config)?;
        let paths = StorePaths::from_config(config)?;
        let timeouts = Timeouts {
            motion_ms: config.motion_timeout_ms,
            manual_ms: config.manual_timeout_ms,
        };

        let reconcilers = ActuatorId::ALL.map(|id| {
            let (trigger, drive) = wiring(id, config);
            ActuatorReconciler::new(id, trigger, drive, paths.for_actuator(id).clone(), timeouts)
        });

        Ok(Self {
            reconcilers,
            paths,
            last_temperature: SensorReading::INVALID,
            last_humidity: SensorReading::INVALID,
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output off and publish status `0` for each.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        for reconciler in &mut self.reconcilers {
            reconciler.publish_initial(&mut *hw, &mut *store, &mut *sink);
        }
        sink.emit(&AppEvent::Started);
        info!("ControllerService started, all outputs off");
    }

    // ── Cadence work ──────────────────────────────────────────

    /// Command intake for all three actuators.
    pub fn poll_commands(
        &mut self,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        for id in ActuatorId::ALL {
            self.poll_command(id, now_ms, &mut *hw, &mut *store, &mut *sink);
        }
    }

    /// Command intake for a single output.
    pub fn poll_command(
        &mut self,
        id: ActuatorId,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        self.reconcilers[id as usize].intake_command(now_ms, hw, store, sink);
    }

    /// Read temperature and humidity once and push the valid ones.
    pub fn push_telemetry(
        &mut self,
        hw: &mut impl SensorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        self.last_temperature = hw.read_temperature();
        self.last_humidity = hw.read_humidity();

        let channels = [
            (SensorKind::Temperature, self.last_temperature, &self.paths.temperature),
            (SensorKind::Humidity, self.last_humidity, &self.paths.humidity),
        ];
        for (kind, reading, path) in channels {
            let Some(value) = reading.get() else {
                warn!("{:?} reading invalid, not published", kind);
                sink.emit(&AppEvent::SensorInvalid(kind));
                continue;
            };
            if let Err(error) = store.set_float(path, value) {
                warn!("store write {} <- {:.1} failed ({})", path, value, error);
                sink.emit(&AppEvent::StoreFailure {
                    op: StoreOp::Write,
                    error,
                });
            }
        }

        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Timeout reversion and autonomous rules for every actuator.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] so sensors are sampled once per tick.
    pub fn reconcile(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let snapshot = SensorSnapshot::capture(hw);
        for reconciler in &mut self.reconcilers {
            reconciler.reconcile(now_ms, &snapshot, &mut *hw, &mut *store, &mut *sink);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot of the most recent climate readings and every output.
    pub fn build_telemetry(&self) -> TelemetryData {
        let output = |id| {
            let state = self.state(id);
            OutputSnapshot {
                engaged: state.engaged,
                mode: state.mode,
            }
        };
        TelemetryData {
            temperature: self.last_temperature,
            humidity: self.last_humidity,
            light: output(ActuatorId::Light),
            device: output(ActuatorId::Device),
            pump: output(ActuatorId::Pump),
        }
    }

    pub fn reconciler(&self, id: ActuatorId) -> &ActuatorReconciler {
        &self.reconcilers[id as usize]
    }

    pub fn state(&self, id: ActuatorId) -> ActuatorState {
        self.reconciler(id).state()
    }

    pub fn mode(&self, id: ActuatorId) -> Mode {
        self.state(id).mode
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Reconciliation ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Trigger and drive for each output.
fn wiring(id: ActuatorId, config: &ControllerConfig) -> (Trigger, Drive) {
    match id {
        ActuatorId::Light => (Trigger::Motion(MotionSensor::Room), Drive::Relay),
        ActuatorId::Device => (Trigger::Motion(MotionSensor::Dorm), Drive::Relay),
        ActuatorId::Pump => (
            Trigger::Humidity {
                threshold_pct: config.humidity_threshold_pct,
            },
            Drive::Servo {
                on_angle: config.pump_on_angle,
                off_angle: config.pump_off_angle,
            },
        ),
    }
}
