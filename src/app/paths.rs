//! Remote store key layout, resolved once at startup.
//!
//! ```text
//! <root>/light/control     <root>/light/status
//! <root>/device/control    <root>/device/status
//! <root>/pump/control      <root>/pump/status
//! <root>/motion/<zone>     (light and device zones)
//! <root>/sensors/temperature
//! <root>/sensors/humidity
//! ```

use core::fmt::Write;

use crate::app::ports::ActuatorId;
use crate::config::ControllerConfig;
use crate::error::{Error, StoreError};

/// Fixed-capacity remote store path.
pub type StorePath = heapless::String<64>;

/// Paths owned by one actuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorPaths {
    /// Integer command field, `{-1, 0, 1}`.
    pub control: StorePath,
    /// Integer status echo, `{0, 1}`.
    pub status: StorePath,
    /// Motion flag written on a rising edge (motion-driven outputs only).
    pub motion: Option<StorePath>,
}

/// Every path the controller reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub light: ActuatorPaths,
    pub device: ActuatorPaths,
    pub pump: ActuatorPaths,
    pub temperature: StorePath,
    pub humidity: StorePath,
}

impl StorePaths {
    pub fn from_config(config: &ControllerConfig) -> Result<Self, Error> {
        let root = config.device_root.as_str();
        Ok(Self {
            light: actuator_paths(root, ActuatorId::Light, Some(config.light_zone.as_str()))?,
            device: actuator_paths(root, ActuatorId::Device, Some(config.device_zone.as_str()))?,
            pump: actuator_paths(root, ActuatorId::Pump, None)?,
            temperature: join(root, &["sensors", "temperature"])?,
            humidity: join(root, &["sensors", "humidity"])?,
        })
    }

    pub fn for_actuator(&self, id: ActuatorId) -> &ActuatorPaths {
        match id {
            ActuatorId::Light => &self.light,
            ActuatorId::Device => &self.device,
            ActuatorId::Pump => &self.pump,
        }
    }
}

fn actuator_paths(root: &str, id: ActuatorId, zone: Option<&str>) -> Result<ActuatorPaths, Error> {
    Ok(ActuatorPaths {
        control: join(root, &[id.key(), "control"])?,
        status: join(root, &[id.key(), "status"])?,
        motion: zone.map(|z| join(root, &["motion", z])).transpose()?,
    })
}

fn join(root: &str, segments: &[&str]) -> Result<StorePath, Error> {
    let mut path = StorePath::new();
    path.push_str(root).map_err(|_| StoreError::PathTooLong)?;
    for seg in segments {
        write!(path, "/{seg}").map_err(|_| StoreError::PathTooLong)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let paths = StorePaths::from_config(&ControllerConfig::default()).unwrap();
        assert_eq!(paths.light.control.as_str(), "/iot_devices/esp32_lab4/light/control");
        assert_eq!(paths.device.status.as_str(), "/iot_devices/esp32_lab4/device/status");
        assert_eq!(paths.pump.control.as_str(), "/iot_devices/esp32_lab4/pump/control");
        assert_eq!(
            paths.light.motion.as_deref(),
            Some("/iot_devices/esp32_lab4/motion/room")
        );
        assert_eq!(
            paths.device.motion.as_deref(),
            Some("/iot_devices/esp32_lab4/motion/dorm")
        );
        assert!(paths.pump.motion.is_none());
        assert_eq!(paths.humidity.as_str(), "/iot_devices/esp32_lab4/sensors/humidity");
    }

    #[test]
    fn overlong_path_is_rejected() {
        let root = "/".repeat(70);
        assert_eq!(
            join(&root, &["light", "control"]),
            Err(Error::Store(StoreError::PathTooLong))
        );
    }
}
