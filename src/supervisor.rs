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

//! One-shot supervisor: wait for sensors, find the chip, validate the PWM
//! nodes, launch the controller and hand back its exit status.

use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus};
use std::thread;

use crate::config::SupervisorConfig;
use crate::devices::validate_control_devices;
use crate::error::{Result, SupervisorError, EXIT_FATAL};
use crate::hwmon::{locate_chip, HwmonSource, SysfsHwmon};
use crate::invocation::ControllerInvocation;
use crate::logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Initializing,
    LocatingChip,
    ValidatingDevices,
    Launching,
    Running,
    Terminated(i32),
    ChipNotFound,
    PumpDeviceMissing,
    /// Configuration or spawn failure before the controller was running.
    Failed,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::Initializing => f.write_str("INITIALIZING"),
            SupervisorState::LocatingChip => f.write_str("LOCATING_CHIP"),
            SupervisorState::ValidatingDevices => f.write_str("VALIDATING_DEVICES"),
            SupervisorState::Launching => f.write_str("LAUNCHING"),
            SupervisorState::Running => f.write_str("RUNNING"),
            SupervisorState::Terminated(code) => write!(f, "TERMINATED({})", code),
            SupervisorState::ChipNotFound => f.write_str("CHIP_NOT_FOUND"),
            SupervisorState::PumpDeviceMissing => f.write_str("PUMP_DEVICE_MISSING"),
            SupervisorState::Failed => f.write_str("FAILED"),
        }
    }
}

/// How the controller process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Exited(i32),
    Signaled(i32),
}

impl ChildExit {
    /// Status to exit with ourselves. Signal deaths use the shell's
    /// `128 + signo` encoding since they carry no exit code.
    pub fn exit_code(self) -> i32 {
        match self {
            ChildExit::Exited(code) => code,
            ChildExit::Signaled(sig) => 128 + sig,
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ChildExit::Exited(code),
            (None, Some(sig)) => ChildExit::Signaled(sig),
            (None, None) => ChildExit::Exited(EXIT_FATAL),
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildExit::Exited(code) => write!(f, "exit code {}", code),
            ChildExit::Signaled(sig) => write!(f, "signal {}", sig),
        }
    }
}

/// Starts the controller and blocks on it. At most one child per runner.
#[cfg_attr(test, mockall::automock)]
pub trait ControllerRunner {
    /// Spawn the controller, returning its pid.
    fn launch(&mut self, invocation: &ControllerInvocation) -> Result<u32>;
    /// Block until the launched controller terminates.
    fn wait(&mut self) -> Result<ChildExit>;
}

/// `ControllerRunner` over `std::process`. The child inherits stdin, stdout
/// and stderr.
#[derive(Debug, Default)]
pub struct CommandRunner {
    child: Option<Child>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControllerRunner for CommandRunner {
    fn launch(&mut self, invocation: &ControllerInvocation) -> Result<u32> {
        let child = Command::new(invocation.program())
            .args(invocation.to_argv())
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: invocation.program().to_string_lossy().into_owned(),
                source,
            })?;
        let pid = child.id();
        self.child = Some(child);
        Ok(pid)
    }

    fn wait(&mut self) -> Result<ChildExit> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| SupervisorError::Wait(io::Error::new(io::ErrorKind::Other, "controller not started")))?;
        let status = child.wait().map_err(SupervisorError::Wait)?;
        self.child = None;
        Ok(ChildExit::from_status(status))
    }
}

pub struct Supervisor<'a> {
    config: &'a SupervisorConfig,
    source: &'a dyn HwmonSource,
    state: SupervisorState,
}

impl<'a> Supervisor<'a> {
    pub fn new(config: &'a SupervisorConfig, source: &'a dyn HwmonSource) -> Self {
        Self {
            config,
            source,
            state: SupervisorState::Initializing,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    fn transition(&mut self, next: SupervisorState) {
        logger::debug(format!("state {} -> {}", self.state, next));
        self.state = next;
    }

    /// Locate the chip, validate its control nodes and build the controller
    /// invocation. Leaves the supervisor in LAUNCHING on success or in the
    /// matching fatal state on failure.
    pub fn prepare(&mut self) -> Result<ControllerInvocation> {
        self.transition(SupervisorState::LocatingChip);
        let chip = match locate_chip(self.source, &self.config.chip_name) {
            Some(chip) => chip,
            None => {
                self.transition(SupervisorState::ChipNotFound);
                return Err(SupervisorError::ChipNotFound {
                    chip: self.config.chip_name.clone(),
                    root: self.config.hwmon_root.clone(),
                });
            }
        };
        logger::info(format!("Found {} at {}", chip.name, chip.path.display()));

        self.transition(SupervisorState::ValidatingDevices);
        let devices = match validate_control_devices(self.source, &chip.path) {
            Ok(d) => d,
            Err(e) => {
                self.transition(SupervisorState::PumpDeviceMissing);
                return Err(e);
            }
        };

        self.transition(SupervisorState::Launching);
        let invocation = ControllerInvocation::build(self.config, &devices);
        let t = &self.config.thresholds;
        logger::info(format!("Temperature threshold: {}°C", t.temp_threshold_c));
        logger::info(format!("Pump PWM range: {}-{}", t.min_pump_pwm, t.max_pump_pwm));
        if !devices.is_pump_only() {
            logger::info(format!("Fan PWM range: {}-{}", t.min_fan_pwm, t.max_fan_pwm));
        }
        logger::info(format!("Controller invocation: {}", invocation));
        Ok(invocation)
    }

    /// Run every phase to completion and return the status this process
    /// should exit with.
    pub fn run(&mut self, runner: &mut dyn ControllerRunner) -> i32 {
        logger::info("Starting AIO cooling supervisor");

        let delay = self.config.startup_delay();
        if !delay.is_zero() {
            logger::info(format!("Waiting {}s for hwmon drivers to settle", delay.as_secs()));
            thread::sleep(delay);
        }

        let invocation = match self.prepare() {
            Ok(inv) => inv,
            Err(e) => {
                logger::error(e.to_string());
                return e.exit_code();
            }
        };

        let pid = match runner.launch(&invocation) {
            Ok(pid) => pid,
            Err(e) => {
                self.transition(SupervisorState::Failed);
                logger::error(e.to_string());
                return e.exit_code();
            }
        };
        self.transition(SupervisorState::Running);
        logger::info(format!("Controller started (pid {})", pid));

        match runner.wait() {
            Ok(exit) => {
                let code = exit.exit_code();
                self.transition(SupervisorState::Terminated(code));
                if code == 0 {
                    logger::info(format!("Controller exited cleanly ({})", exit));
                } else {
                    logger::error(format!("Controller terminated with {}; exiting with {}", exit, code));
                }
                code
            }
            Err(e) => {
                self.transition(SupervisorState::Failed);
                logger::error(e.to_string());
                e.exit_code()
            }
        }
    }
}

/// Blocking entry point against the real sysfs tree and `std::process`.
pub fn run_supervisor(config: &SupervisorConfig) -> i32 {
    let source = SysfsHwmon::new(&config.hwmon_root);
    let mut runner = CommandRunner::new();
    Supervisor::new(config, &source).run(&mut runner)
}
