//! Application core: pure domain logic, zero I/O.
//!
//! Holds the command vocabulary, remote store layout, domain events and
//! the [`service::ControllerService`] that owns the three actuator
//! reconcilers.  All interaction with hardware and the remote store goes
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod paths;
pub mod ports;
pub mod service;
