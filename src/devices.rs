/*
 * This file is part of aiowarden.
 *
 * Copyright (C) 2025 aiowarden contributors
 *
 * aiowarden is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * aiowarden is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with aiowarden. If not, see <https://www.gnu.org/licenses/>.
 */

//! Control-node validation for the pump and fan PWM channels.
//!
//! The channel wiring is fixed for this board: the AIO pump header is
//! driven by `pwm2`, the radiator fan header by `pwm1`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, SupervisorError};
use crate::hwmon::HwmonSource;
use crate::logger;

pub const PUMP_CHANNEL: usize = 2;
pub const FAN_CHANNEL: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRole {
    Pump,
    Fan,
}

impl ControlRole {
    pub fn channel(self) -> usize {
        match self {
            ControlRole::Pump => PUMP_CHANNEL,
            ControlRole::Fan => FAN_CHANNEL,
        }
    }
}

impl fmt::Display for ControlRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlRole::Pump => f.write_str("pump"),
            ControlRole::Fan => f.write_str("fan"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlDevice {
    pub role: ControlRole,
    pub path: PathBuf,
}

/// Devices confirmed present on the chip. The pump is always there; the fan
/// only when its node existed at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDevices {
    pub pump: ControlDevice,
    pub fan: Option<ControlDevice>,
}

impl ValidatedDevices {
    pub fn is_pump_only(&self) -> bool {
        self.fan.is_none()
    }
}

pub fn node_path(chip_path: &Path, role: ControlRole) -> PathBuf {
    chip_path.join(format!("pwm{}", role.channel()))
}

fn check_node(source: &dyn HwmonSource, chip_path: &Path, role: ControlRole) -> Option<ControlDevice> {
    let path = node_path(chip_path, role);
    if !source.is_control_node(&path) {
        return None;
    }
    if !source.is_writable(&path) {
        logger::warn(format!("No write permission for {} PWM device: {}", role, path.display()));
    }
    Some(ControlDevice { role, path })
}

pub fn validate_control_devices(source: &dyn HwmonSource, chip_path: &Path) -> Result<ValidatedDevices> {
    let pump = match check_node(source, chip_path, ControlRole::Pump) {
        Some(dev) => dev,
        None => {
            return Err(SupervisorError::PumpDeviceMissing(node_path(chip_path, ControlRole::Pump)));
        }
    };
    logger::info(format!("AIO pump PWM device: {}", pump.path.display()));

    let fan = check_node(source, chip_path, ControlRole::Fan);
    match &fan {
        Some(dev) => logger::info(format!("Fan PWM device: {}", dev.path.display())),
        None => logger::info(format!(
            "Fan PWM device not found at {}; continuing in pump-only mode",
            node_path(chip_path, ControlRole::Fan).display()
        )),
    }

    Ok(ValidatedDevices { pump, fan })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwmon::MockHwmonSource;
    use crate::test_utils::FakeHwmon;
    use mockall::predicate::eq;
    use serial_test::serial;

    const CHIP: &str = "/sys/class/hwmon/hwmon3";

    #[test]
    fn test_node_paths_follow_channel_policy() {
        let chip = Path::new(CHIP);
        assert_eq!(node_path(chip, ControlRole::Pump), PathBuf::from("/sys/class/hwmon/hwmon3/pwm2"));
        assert_eq!(node_path(chip, ControlRole::Fan), PathBuf::from("/sys/class/hwmon/hwmon3/pwm1"));
    }

    #[test]
    fn test_both_devices_present() {
        let fake = FakeHwmon::new()
            .with_chip(CHIP, "nct6798")
            .with_node(&format!("{}/pwm1", CHIP))
            .with_node(&format!("{}/pwm2", CHIP));
        let devices = validate_control_devices(&fake, Path::new(CHIP)).unwrap();
        assert_eq!(devices.pump.path, PathBuf::from(format!("{}/pwm2", CHIP)));
        assert_eq!(devices.pump.role, ControlRole::Pump);
        let fan = devices.fan.unwrap();
        assert_eq!(fan.path, PathBuf::from(format!("{}/pwm1", CHIP)));
        assert_eq!(fan.role, ControlRole::Fan);
    }

    #[test]
    fn test_fan_missing_is_pump_only() {
        let fake = FakeHwmon::new()
            .with_chip(CHIP, "nct6798")
            .with_node(&format!("{}/pwm2", CHIP));
        let devices = validate_control_devices(&fake, Path::new(CHIP)).unwrap();
        assert!(devices.is_pump_only());
    }

    #[test]
    fn test_pump_missing_is_fatal() {
        let fake = FakeHwmon::new()
            .with_chip(CHIP, "nct6798")
            .with_node(&format!("{}/pwm1", CHIP));
        let err = validate_control_devices(&fake, Path::new(CHIP)).unwrap_err();
        match err {
            SupervisorError::PumpDeviceMissing(p) => assert_eq!(p, PathBuf::from(format!("{}/pwm2", CHIP))),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pump_missing_skips_fan_check() {
        let mut mock = MockHwmonSource::new();
        mock.expect_is_control_node()
            .with(eq(PathBuf::from(format!("{}/pwm2", CHIP))))
            .times(1)
            .return_const(false);
        mock.expect_is_writable().never();
        assert!(validate_control_devices(&mock, Path::new(CHIP)).is_err());
    }

    #[test]
    fn test_unwritable_nodes_still_validate() {
        let mut mock = MockHwmonSource::new();
        mock.expect_is_control_node().return_const(true);
        mock.expect_is_writable().times(2).return_const(false);
        let devices = validate_control_devices(&mock, Path::new(CHIP)).unwrap();
        assert!(devices.fan.is_some());
    }

    #[test]
    #[serial]
    fn test_unwritable_pump_logs_warning() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("aiowarden.log");
        assert_eq!(logger::init_logging(&log_path), Some(log_path.clone()));

        let mut mock = MockHwmonSource::new();
        mock.expect_is_control_node().return_const(true);
        mock.expect_is_writable().return_const(false);
        validate_control_devices(&mock, Path::new(CHIP)).unwrap();
        logger::close_logging();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains(" - WARNING - No write permission for pump PWM device: /sys/class/hwmon/hwmon3/pwm2"));
        assert!(contents.contains(" - WARNING - No write permission for fan PWM device: /sys/class/hwmon/hwmon3/pwm1"));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(ControlRole::Pump.to_string(), "pump");
        assert_eq!(ControlRole::Fan.to_string(), "fan");
    }
}
