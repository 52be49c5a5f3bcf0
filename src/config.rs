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

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SupervisorError};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/aiowarden/config.json";
pub const CONFIG_ENV_VAR: &str = "AIOWARDEN_CONFIG";

/// Hottest threshold we accept; anything above is almost certainly a typo.
const MAX_THRESHOLD_C: u8 = 120;

fn default_chip_name() -> String {
    "nct6798".to_string()
}

fn default_hwmon_root() -> PathBuf {
    PathBuf::from("/sys/class/hwmon")
}

fn default_startup_delay_secs() -> u64 {
    10
}

fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log/aiowarden.log")
}

fn default_temp_threshold_c() -> u8 {
    70
}

fn default_min_pump_pwm() -> u8 {
    100
}

fn default_min_fan_pwm() -> u8 {
    80
}

fn default_max_pwm() -> u8 {
    255
}

fn default_controller_program() -> String {
    "python3".to_string()
}

fn default_controller_args() -> Vec<String> {
    vec!["/usr/local/lib/aiowarden/gpu-temperature-aio-controller.py".to_string()]
}

/// Temperature threshold and PWM bounds handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlThresholds {
    #[serde(default = "default_temp_threshold_c")]
    pub temp_threshold_c: u8,
    #[serde(default = "default_min_pump_pwm")]
    pub min_pump_pwm: u8,
    #[serde(default = "default_max_pwm")]
    pub max_pump_pwm: u8,
    #[serde(default = "default_min_fan_pwm")]
    pub min_fan_pwm: u8,
    #[serde(default = "default_max_pwm")]
    pub max_fan_pwm: u8,
}

impl Default for ControlThresholds {
    fn default() -> Self {
        Self {
            temp_threshold_c: default_temp_threshold_c(),
            min_pump_pwm: default_min_pump_pwm(),
            max_pump_pwm: default_max_pwm(),
            min_fan_pwm: default_min_fan_pwm(),
            max_fan_pwm: default_max_pwm(),
        }
    }
}

/// The external controller executable plus any leading arguments (for
/// instance the interpreter and script path).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerSpec {
    #[serde(default = "default_controller_program")]
    pub program: String,
    #[serde(default = "default_controller_args")]
    pub args: Vec<String>,
}

impl Default for ControllerSpec {
    fn default() -> Self {
        Self {
            program: default_controller_program(),
            args: default_controller_args(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupervisorConfig {
    #[serde(default = "default_chip_name")]
    pub chip_name: String,
    #[serde(default = "default_hwmon_root")]
    pub hwmon_root: PathBuf,
    /// Wait before probing so hwmon drivers finish registering after boot.
    #[serde(default = "default_startup_delay_secs")]
    pub startup_delay_secs: u64,
    #[serde(default)]
    pub thresholds: ControlThresholds,
    /// Controller poll interval, forwarded as `--interval` when set.
    #[serde(default)]
    pub interval_secs: Option<u32>,
    /// Controller PWM adjustment step, forwarded as `--step` when set.
    #[serde(default)]
    pub pwm_step: Option<u8>,
    #[serde(default)]
    pub controller: ControllerSpec,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            chip_name: default_chip_name(),
            hwmon_root: default_hwmon_root(),
            startup_delay_secs: default_startup_delay_secs(),
            thresholds: ControlThresholds::default(),
            interval_secs: None,
            pwm_step: None,
            controller: ControllerSpec::default(),
            log_path: default_log_path(),
        }
    }
}

impl SupervisorConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }
}

/// Resolve the config file location: explicit path, then `AIOWARDEN_CONFIG`,
/// then the system default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match env::var(CONFIG_ENV_VAR) {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Load and validate the config at `path`. Returns `Ok(None)` when the file
/// does not exist so the caller can fall back to defaults.
pub fn load_config(path: &Path) -> Result<Option<SupervisorConfig>> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SupervisorError::ConfigRead { path: path.to_path_buf(), source });
        }
    };
    let cfg: SupervisorConfig = serde_json::from_str(&data)
        .map_err(|source| SupervisorError::ConfigParse { path: path.to_path_buf(), source })?;
    validate_config(&cfg)?;
    Ok(Some(cfg))
}

pub fn validate_config(cfg: &SupervisorConfig) -> Result<()> {
    if cfg.chip_name.is_empty() || cfg.chip_name.len() > 64 {
        return Err(SupervisorError::invalid_config("chip_name", "must be 1-64 characters"));
    }
    if cfg.chip_name.contains('/') {
        return Err(SupervisorError::invalid_config("chip_name", "must not contain '/'"));
    }

    let t = &cfg.thresholds;
    if t.temp_threshold_c > MAX_THRESHOLD_C {
        return Err(SupervisorError::invalid_config(
            "temp_threshold_c",
            format!("{} exceeds {}°C", t.temp_threshold_c, MAX_THRESHOLD_C),
        ));
    }
    if t.min_pump_pwm > t.max_pump_pwm {
        return Err(SupervisorError::invalid_config(
            "min_pump_pwm",
            format!("{} is greater than max_pump_pwm {}", t.min_pump_pwm, t.max_pump_pwm),
        ));
    }
    if t.min_fan_pwm > t.max_fan_pwm {
        return Err(SupervisorError::invalid_config(
            "min_fan_pwm",
            format!("{} is greater than max_fan_pwm {}", t.min_fan_pwm, t.max_fan_pwm),
        ));
    }

    if cfg.interval_secs == Some(0) {
        return Err(SupervisorError::invalid_config("interval_secs", "must be at least 1"));
    }
    if cfg.pwm_step == Some(0) {
        return Err(SupervisorError::invalid_config("pwm_step", "must be at least 1"));
    }
    if cfg.controller.program.trim().is_empty() {
        return Err(SupervisorError::invalid_config("controller.program", "must not be empty"));
    }
    Ok(())
}
