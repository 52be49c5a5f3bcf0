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

//! aiowarden - supervisor for a GPU-temperature AIO pump controller
//!
//! Finds the nct6798 super-I/O chip in hwmon, checks its pump (`pwm2`) and
//! fan (`pwm1`) PWM nodes, then launches the external controller with those
//! paths and waits on it, exiting with the controller's status.

pub mod config;
pub mod devices;
pub mod error;
pub mod hwmon;
pub mod invocation;
pub mod logger;
pub mod report;
pub mod supervisor;
pub mod system;

#[cfg(test)]
pub mod test_utils;
