//! Room automation controller library.
//!
//! Exposes the pure-logic modules for integration testing and host-side
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod reconciler;
pub mod runtime;
pub mod scheduler;
pub mod secrets;

pub mod adapters;
pub mod drivers;
pub mod sensors;
