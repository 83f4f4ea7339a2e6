//! Cadence engine.
//!
//! Runs the two periodic activities of the control loop off the wrapping
//! millisecond clock.  The scheduler notifies a [`SchedulerDelegate`] when
//! a cadence is due; the control loop implements the delegate to run
//! command intake or telemetry.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Loop iteration                           │
//! │                                                              │
//! │  ┌──────────────┐   ┌──────────────┐                         │
//! │  │ CommandPoll  │   │  Telemetry   │                         │
//! │  │   1000 ms    │   │   3500 ms    │                         │
//! │  └──────┬───────┘   └──────┬───────┘                         │
//! │         │                  │                                 │
//! │         ▼                  ▼                                 │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          │                                   │
//! │                          ▼                                   │
//! │                ControllerService.poll_commands()             │
//! │                ControllerService.push_telemetry()            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reconciliation is not a cadence: it runs on every iteration.

use crate::app::ports::{CadenceKind, SchedulerDelegate};
use crate::config::ControllerConfig;
use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Cadence
// ═══════════════════════════════════════════════════════════════

/// One periodic activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub kind: CadenceKind,
    pub interval_ms: u32,
    /// Uptime at which this cadence last fired (or was armed).
    last_ms: u32,
}

impl Cadence {
    pub fn new(kind: CadenceKind, interval_ms: u32) -> Self {
        Self {
            kind,
            interval_ms,
            last_ms: 0,
        }
    }

    /// Due once at least `interval_ms` has elapsed.  `wrapping_sub` keeps
    /// the interval correct across the `u32` rollover.
    pub fn is_due(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_ms) >= self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Number of cadences the control loop runs.
const CADENCE_COUNT: usize = 2;

/// The scheduler engine.
///
/// Decoupled from the service: when a cadence fires it invokes the
/// [`SchedulerDelegate`] callback, which keeps the scheduler testable
/// with a recording delegate.
pub struct Scheduler {
    cadences: [Cadence; CADENCE_COUNT],
}

impl Scheduler {
    pub fn new(command_poll_interval_ms: u32, telemetry_interval_ms: u32) -> Self {
        Self {
            cadences: [
                Cadence::new(CadenceKind::CommandPoll, command_poll_interval_ms),
                Cadence::new(CadenceKind::Telemetry, telemetry_interval_ms),
            ],
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.command_poll_interval_ms, config.telemetry_interval_ms)
    }

    /// Restart every interval from `now_ms`.
    pub fn arm(&mut self, now_ms: u32) {
        for cadence in &mut self.cadences {
            cadence.last_ms = now_ms;
        }
    }

    /// Tick the scheduler.  Call once per loop iteration.
    ///
    /// Due cadences fire in declaration order (command poll before
    /// telemetry) and their interval restarts at `now_ms`; a late
    /// iteration never causes a burst of catch-up fires.
    pub fn tick(&mut self, now_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for cadence in &mut self.cadences {
            if cadence.is_due(now_ms) {
                debug!("Scheduler: {:?} due at {}ms", cadence.kind, now_ms);
                cadence.last_ms = now_ms;
                delegate.on_cadence_due(cadence.kind, now_ms);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
