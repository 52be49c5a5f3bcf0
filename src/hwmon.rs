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

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::logger;
use crate::system;

/// One hwmon instance: the chip name it declares and its sysfs directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwmonEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Read-only view of the hwmon namespace.
#[cfg_attr(test, mockall::automock)]
pub trait HwmonSource {
    /// Every instance with a readable `name`, in directory-listing order.
    /// Names are read lazily as the iterator advances.
    fn list_chips(&self) -> Box<dyn Iterator<Item = HwmonEntry>>;
    /// True when `path` is an existing regular file.
    fn is_control_node(&self, path: &Path) -> bool;
    /// True when this process may write to `path`.
    fn is_writable(&self, path: &Path) -> bool;
}

/// `HwmonSource` backed by the real filesystem, rooted at `/sys/class/hwmon`
/// or any directory laid out the same way.
#[derive(Debug, Clone)]
pub struct SysfsHwmon {
    root: PathBuf,
}

impl SysfsHwmon {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl HwmonSource for SysfsHwmon {
    fn list_chips(&self) -> Box<dyn Iterator<Item = HwmonEntry>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(it) => it,
            Err(e) => {
                logger::debug(format!("cannot list {}: {}", self.root.display(), e));
                return Box::new(std::iter::empty::<HwmonEntry>());
            }
        };

        Box::new(entries.flatten().filter_map(|ent| {
            let path = ent.path();
            match read_name(&path.join("name")) {
                Ok(name) => Some(HwmonEntry { name, path }),
                Err(e) => {
                    logger::debug(format!("skipping {}: unreadable name ({})", path.display(), e));
                    None
                }
            }
        }))
    }

    fn is_control_node(&self, path: &Path) -> bool {
        // metadata() follows symlinks, which sysfs uses heavily
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    fn is_writable(&self, path: &Path) -> bool {
        system::is_writable(path)
    }
}

/// Read a chip `name` file. Only the trailing newline is removed; any other
/// whitespace is part of the name.
fn read_name(p: &Path) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    if s.ends_with('\n') {
        s.pop();
    }
    Ok(s)
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

/// Return the first chip whose declared name equals `target` exactly.
///
/// When several instances share the name, the first one in enumeration
/// order is returned and entries after it are never read.
pub fn locate_chip(source: &dyn HwmonSource, target: &str) -> Option<HwmonEntry> {
    source.list_chips().find(|entry| entry.name == target)
}

pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.starts_with(prefix) && fname.ends_with(suffix) && fname.len() > prefix.len() + suffix.len() {
        let mid = &fname[prefix.len()..fname.len() - suffix.len()];
        if mid.bytes().all(|b| b.is_ascii_digit()) {
            return mid.parse().ok();
        }
    }
    None
}

// ============================================================================
// PWM inventory (used by `aiowarden list`)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PwmMode {
    Automatic,
    Manual,
    Other(String),
    Unreadable,
}

impl PwmMode {
    fn from_enable(raw: &str) -> Self {
        match raw {
            "0" => PwmMode::Automatic,
            "1" => PwmMode::Manual,
            other => PwmMode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PwmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwmMode::Automatic => f.write_str("Automatic control"),
            PwmMode::Manual => f.write_str("Manual control"),
            PwmMode::Other(code) => write!(f, "Unknown mode: {}", code),
            PwmMode::Unreadable => f.write_str("Unable to read"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwmNode {
    pub index: usize,
    pub path: PathBuf,
    pub label: Option<String>,
    pub value: Option<String>,
    pub mode: PwmMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwmChip {
    pub path: PathBuf,
    /// `None` when the chip's name file is unreadable.
    pub name: Option<String>,
    pub nodes: Vec<PwmNode>,
}

/// Collect every chip under `root` exposing at least one `pwmN` node.
/// Chips come back sorted by path and nodes by channel index.
pub fn enumerate_pwm_chips(root: &Path) -> Vec<PwmChip> {
    let mut chips = Vec::new();
    let Ok(entries) = fs::read_dir(root) else { return chips };

    for ent in entries.flatten() {
        let dir = ent.path();
        let Ok(files) = fs::read_dir(&dir) else { continue };

        let mut nodes: Vec<PwmNode> = Vec::new();
        for file in files.flatten() {
            let fname = file.file_name();
            let fname = fname.to_string_lossy();
            let Some(idx) = extract_index(&fname, "pwm", "") else { continue };

            let path = dir.join(format!("pwm{}", idx));
            let label = read_trimmed(dir.join(format!("pwm{}_label", idx))).ok();
            let value = read_trimmed(&path).ok();
            let enable_path = dir.join(format!("pwm{}_enable", idx));
            let mode = match read_trimmed(&enable_path) {
                Ok(raw) => PwmMode::from_enable(&raw),
                Err(_) => PwmMode::Unreadable,
            };
            nodes.push(PwmNode { index: idx, path, label, value, mode });
        }

        if nodes.is_empty() {
            continue;
        }
        nodes.sort_by_key(|n| n.index);
        let name = read_trimmed(dir.join("name")).ok();
        chips.push(PwmChip { path: dir, name, nodes });
    }

    chips.sort_by(|a, b| a.path.cmp(&b.path));
    chips
}
