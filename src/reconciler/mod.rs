//! Per-actuator reconciliation engine.
//!
//! Three control sources compete for every output:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  ActuatorReconciler (one per light / device / pump)         │
//! │                                                            │
//! │  1. command intake   (poll cadence)   ──▶ MANUAL, apply    │
//! │  2. manual timeout   (every tick)     ──▶ AUTO             │
//! │  3. autonomous rule  (every tick, AUTO only) ──▶ apply     │
//! └────────────────────────────────────────────────────────────┘
//!
//!            any command                     timeout expiry
//!   AUTO ───────────────────▶ MANUAL ───────────────────▶ AUTO
//! ```
//!
//! Precedence is strict: a reconciler applies at most one decision per
//! tick, and every change to `engaged` is mirrored to the actuator and to
//! the remote `status` field before the tick ends.

pub mod context;
pub mod timing;

use log::{debug, info, warn};

use crate::app::commands::PendingCommand;
use crate::app::events::{AppEvent, ControlSource, SensorKind, StoreOp};
use crate::app::paths::ActuatorPaths;
use crate::app::ports::{ActuatorId, ActuatorPort, EventSink, MotionSensor, RemoteStorePort};

use context::{ActuatorState, SensorSnapshot};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Which policy currently governs an actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sensor-driven rules decide.
    Auto,
    /// A remote command decided at `entered_at` (uptime ms).
    Manual { entered_at: u32 },
}

impl Mode {
    pub fn is_manual(self) -> bool {
        matches!(self, Self::Manual { .. })
    }
}

// ---------------------------------------------------------------------------
// Static per-actuator wiring
// ---------------------------------------------------------------------------

/// The autonomous rule an actuator follows while in AUTO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// On while motion is seen; off after `motion_timeout_ms` without it.
    Motion(MotionSensor),
    /// On below `threshold_pct` relative humidity, off at or above it.
    Humidity { threshold_pct: f32 },
}

/// How `engaged` maps onto the physical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Digital relay output.
    Relay,
    /// Servo moved between two fixed angles.
    Servo { on_angle: u8, off_angle: u8 },
}

/// Timeouts shared by every reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub motion_ms: u32,
    pub manual_ms: u32,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Decision unit that owns one actuator's state.
pub struct ActuatorReconciler {
    id: ActuatorId,
    trigger: Trigger,
    drive: Drive,
    paths: ActuatorPaths,
    timeouts: Timeouts,
    state: ActuatorState,
}

impl ActuatorReconciler {
    /// Construct in the power-on state: off, AUTO.
    pub fn new(
        id: ActuatorId,
        trigger: Trigger,
        drive: Drive,
        paths: ActuatorPaths,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            id,
            trigger,
            drive,
            paths,
            timeouts,
            state: ActuatorState::default(),
        }
    }

    pub fn id(&self) -> ActuatorId {
        self.id
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    pub fn engaged(&self) -> bool {
        self.state.engaged
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    // ── Startup ───────────────────────────────────────────────

    /// Drive the output to its off position and publish status `0`.
    pub fn publish_initial(
        &mut self,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        self.state.engaged = false;
        self.drive_output(hw);
        write_int(store, sink, &self.paths.status, 0);
        sink.emit(&AppEvent::OutputChanged {
            actuator: self.id,
            engaged: false,
            source: ControlSource::Startup,
        });
    }

    // ── 1. Command intake ─────────────────────────────────────

    /// Poll this actuator's `control` field and apply a pending command.
    ///
    /// Any `ON`/`OFF` value (re)enters MANUAL and resets the manual timer,
    /// then is acknowledged by writing `-1`.  The output and `status` are
    /// only written when the command actually changes `engaged`.
    pub fn intake_command(
        &mut self,
        now_ms: u32,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        let raw = match store.get_int(&self.paths.control) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(error) => {
                warn!("{}: command read failed ({})", self.id.key(), error);
                sink.emit(&AppEvent::StoreFailure {
                    op: StoreOp::Read,
                    error,
                });
                return;
            }
        };

        let command = match PendingCommand::try_from(raw) {
            Ok(cmd) => cmd,
            Err(unknown) => {
                warn!("{}: {}, ignoring", self.id.key(), unknown);
                sink.emit(&AppEvent::CommandIgnored {
                    actuator: self.id,
                    raw,
                });
                return;
            }
        };

        let Some(target) = command.target() else {
            return;
        };

        self.enter_manual(now_ms, sink);

        if target == self.state.engaged {
            debug!(
                "{}: command {:?} matches current state, acknowledging only",
                self.id.key(),
                command
            );
        } else {
            info!("{}: remote command {:?}", self.id.key(), command);
            self.apply(target, ControlSource::Manual, hw, store, sink);
        }

        if write_int(store, sink, &self.paths.control, PendingCommand::NoOp.raw()) {
            sink.emit(&AppEvent::CommandAcknowledged {
                actuator: self.id,
                command,
            });
        }
    }

    // ── 2 + 3. Per-tick evaluation ────────────────────────────

    /// Run timeout reversion, then the autonomous rule if in AUTO.
    pub fn reconcile(
        &mut self,
        now_ms: u32,
        snapshot: &SensorSnapshot,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        self.check_reversion(now_ms, sink);

        if self.state.mode.is_manual() {
            return;
        }

        match self.trigger {
            Trigger::Motion(sensor) => {
                self.evaluate_motion(now_ms, snapshot.motion(sensor), hw, store, sink);
            }
            Trigger::Humidity { threshold_pct } => {
                self.evaluate_humidity(snapshot, threshold_pct, hw, store, sink);
            }
        }
    }

    fn check_reversion(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        if let Mode::Manual { entered_at } = self.state.mode {
            if timing::expired(entered_at, now_ms, self.timeouts.manual_ms) {
                info!("{}: manual timeout, returning to auto", self.id.key());
                self.set_mode(Mode::Auto, sink);
            }
        }
    }

    fn evaluate_motion(
        &mut self,
        now_ms: u32,
        motion: bool,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        if motion {
            self.state.last_trigger_at = now_ms;
            if !self.state.engaged {
                info!("{}: motion detected", self.id.key());
                self.apply(true, ControlSource::Auto, hw, store, sink);
                if let Some(path) = &self.paths.motion {
                    write_int(store, sink, path, 1);
                }
            }
        } else if self.state.engaged
            && timing::expired(self.state.last_trigger_at, now_ms, self.timeouts.motion_ms)
        {
            info!("{}: no motion for {}ms", self.id.key(), self.timeouts.motion_ms);
            self.apply(false, ControlSource::Auto, hw, store, sink);
        }
    }

    fn evaluate_humidity(
        &mut self,
        snapshot: &SensorSnapshot,
        threshold_pct: f32,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        let Some(humidity) = snapshot.humidity.get() else {
            warn!("{}: humidity reading invalid, skipping", self.id.key());
            sink.emit(&AppEvent::SensorInvalid(SensorKind::Humidity));
            return;
        };

        let want = humidity < threshold_pct;
        if want != self.state.engaged {
            info!(
                "{}: humidity {:.1}% (threshold {:.1}%)",
                self.id.key(),
                humidity,
                threshold_pct
            );
            self.apply(want, ControlSource::Auto, hw, store, sink);
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn enter_manual(&mut self, now_ms: u32, sink: &mut impl EventSink) {
        self.set_mode(Mode::Manual { entered_at: now_ms }, sink);
    }

    fn set_mode(&mut self, next: Mode, sink: &mut impl EventSink) {
        let prev = self.state.mode;
        self.state.mode = next;
        if prev.is_manual() != next.is_manual() {
            sink.emit(&AppEvent::ModeChanged {
                actuator: self.id,
                from: prev,
                to: next,
            });
        }
    }

    /// Commit a new `engaged` value: output first, then status echo.
    fn apply(
        &mut self,
        engaged: bool,
        source: ControlSource,
        hw: &mut impl ActuatorPort,
        store: &mut impl RemoteStorePort,
        sink: &mut impl EventSink,
    ) {
        self.state.engaged = engaged;
        self.drive_output(hw);
        write_int(store, sink, &self.paths.status, i32::from(engaged));
        sink.emit(&AppEvent::OutputChanged {
            actuator: self.id,
            engaged,
            source,
        });
    }

    fn drive_output(&self, hw: &mut impl ActuatorPort) {
        match self.drive {
            Drive::Relay => hw.set_digital_output(self.id, self.state.engaged),
            Drive::Servo {
                on_angle,
                off_angle,
            } => hw.set_servo_position(if self.state.engaged { on_angle } else { off_angle }),
        }
    }
}

/// Write an integer, logging and reporting failure.  Returns `true` on success.
fn write_int(
    store: &mut impl RemoteStorePort,
    sink: &mut impl EventSink,
    path: &str,
    value: i32,
) -> bool {
    match store.set_int(path, value) {
        Ok(()) => true,
        Err(error) => {
            warn!("store write {} <- {} failed ({})", path, value, error);
            sink.emit(&AppEvent::StoreFailure {
                op: StoreOp::Write,
                error,
            });
            false
        }
    }
}
