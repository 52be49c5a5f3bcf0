/*
 * Test utilities for aiowarden
 *
 * An in-memory hwmon namespace for discovery/validation tests and a helper
 * that lays out a sysfs-like tree inside a temporary directory.
 */

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::hwmon::{HwmonEntry, HwmonSource};

/// Chips are listed in insertion order; every registered node is writable.
#[derive(Debug, Default, Clone)]
pub struct FakeHwmon {
    chips: Vec<HwmonEntry>,
    nodes: HashSet<PathBuf>,
}

impl FakeHwmon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chip(mut self, path: &str, name: &str) -> Self {
        self.chips.push(HwmonEntry { name: name.to_string(), path: PathBuf::from(path) });
        self
    }

    pub fn with_node(mut self, path: &str) -> Self {
        self.nodes.insert(PathBuf::from(path));
        self
    }
}

impl HwmonSource for FakeHwmon {
    fn list_chips(&self) -> Box<dyn Iterator<Item = HwmonEntry>> {
        Box::new(self.chips.clone().into_iter())
    }

    fn is_control_node(&self, path: &Path) -> bool {
        self.nodes.contains(path)
    }

    fn is_writable(&self, path: &Path) -> bool {
        self.nodes.contains(path)
    }
}

/// A throwaway directory shaped like `/sys/class/hwmon`.
pub struct SysfsTree {
    dir: TempDir,
}

impl SysfsTree {
    pub fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("create temp hwmon root") }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<entry>` with an optional `name` file (written verbatim)
    /// and the given PWM nodes, each holding `128`.
    pub fn chip(&self, entry: &str, name: Option<&str>, pwms: &[&str]) -> PathBuf {
        let dir = self.root().join(entry);
        fs::create_dir_all(&dir).expect("create chip dir");
        if let Some(name) = name {
            self.write(&dir.join("name"), name);
        }
        for pwm in pwms {
            self.write(&dir.join(pwm), "128\n");
        }
        dir
    }

    pub fn write(&self, path: &Path, contents: &str) {
        fs::write(path, contents).expect("write sysfs attribute");
    }
}
