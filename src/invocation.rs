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

//! Structured command line for the external cooling controller.
//!
//! Arguments are kept as (key, value) pairs and only flattened into an argv
//! at the spawn boundary. Nothing ever goes through a shell.

use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::config::{ControllerSpec, SupervisorConfig};
use crate::devices::ValidatedDevices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKey {
    Pump,
    Fans,
    Threshold,
    MinPump,
    MaxPump,
    MinFan,
    MaxFan,
    Interval,
    Step,
}

impl ArgKey {
    pub fn flag(self) -> &'static str {
        match self {
            ArgKey::Pump => "--pump",
            ArgKey::Fans => "--fans",
            ArgKey::Threshold => "--threshold",
            ArgKey::MinPump => "--min-pump",
            ArgKey::MaxPump => "--max-pump",
            ArgKey::MinFan => "--min-fan",
            ArgKey::MaxFan => "--max-fan",
            ArgKey::Interval => "--interval",
            ArgKey::Step => "--step",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInvocation {
    program: OsString,
    prefix_args: Vec<OsString>,
    args: Vec<(ArgKey, OsString)>,
}

impl ControllerInvocation {
    /// Only callable with a `ValidatedDevices`, so an invocation cannot exist
    /// without a confirmed pump node.
    pub fn build(cfg: &SupervisorConfig, devices: &ValidatedDevices) -> Self {
        let t = &cfg.thresholds;
        let mut args: Vec<(ArgKey, OsString)> = vec![
            (ArgKey::Pump, devices.pump.path.clone().into_os_string()),
            (ArgKey::Threshold, t.temp_threshold_c.to_string().into()),
            (ArgKey::MinPump, t.min_pump_pwm.to_string().into()),
            (ArgKey::MaxPump, t.max_pump_pwm.to_string().into()),
        ];

        if let Some(fan) = &devices.fan {
            args.push((ArgKey::Fans, fan.path.clone().into_os_string()));
            args.push((ArgKey::MinFan, t.min_fan_pwm.to_string().into()));
            args.push((ArgKey::MaxFan, t.max_fan_pwm.to_string().into()));
        }
        if let Some(secs) = cfg.interval_secs {
            args.push((ArgKey::Interval, secs.to_string().into()));
        }
        if let Some(step) = cfg.pwm_step {
            args.push((ArgKey::Step, step.to_string().into()));
        }

        Self::with_args(&cfg.controller, args)
    }

    fn with_args(controller: &ControllerSpec, args: Vec<(ArgKey, OsString)>) -> Self {
        Self {
            program: OsString::from(&controller.program),
            prefix_args: controller.args.iter().map(OsString::from).collect(),
            args,
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get(&self, key: ArgKey) -> Option<&OsStr> {
        self.args.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_os_str())
    }

    pub fn has(&self, key: ArgKey) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = ArgKey> + '_ {
        self.args.iter().map(|(k, _)| *k)
    }

    /// Arguments after the program name, ready for `Command::args`.
    pub fn to_argv(&self) -> Vec<OsString> {
        let mut argv = self.prefix_args.clone();
        for (key, value) in &self.args {
            argv.push(key.flag().into());
            argv.push(value.clone());
        }
        argv
    }
}

/// Rendered for the log only.
impl fmt::Display for ControllerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in self.to_argv() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
