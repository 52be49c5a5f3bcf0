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

//! Error type shared by discovery, validation and launch.

use std::io;
use std::path::PathBuf;

/// Exit status used for every failure detected before the controller runs.
pub const EXIT_FATAL: i32 = 1;

/// Result type alias using SupervisorError
pub type Result<T> = std::result::Result<T, SupervisorError>;

#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    // ============================================================================
    // Discovery
    // ============================================================================
    #[error("hwmon chip '{chip}' not found under {root}")]
    ChipNotFound {
        chip: String,
        root: PathBuf,
    },

    #[error("pump PWM device not found: {0}")]
    PumpDeviceMissing(PathBuf),

    // ============================================================================
    // Configuration
    // ============================================================================
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    // ============================================================================
    // Controller process
    // ============================================================================
    #[error("Failed to launch controller {program}: {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },

    #[error("Failed to wait for controller: {0}")]
    Wait(#[source] io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl SupervisorError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Process exit status for this failure. Every variant is raised before the
    /// controller reaches RUNNING, so all of them map to the fatal status.
    pub fn exit_code(&self) -> i32 {
        EXIT_FATAL
    }
}
