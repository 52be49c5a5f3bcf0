/*
 * Integration tests for aiowarden
 *
 * These run the whole supervisor against a sysfs-shaped temp directory and a
 * stand-in controller shell script, checking the command line it receives
 * and the exit status that comes back.
 */

use std::fs;
use std::path::{Path, PathBuf};

use aiowarden::config::{ControllerSpec, SupervisorConfig};
use aiowarden::logger;
use aiowarden::supervisor::{run_supervisor, CommandRunner, Supervisor, SupervisorState};
use aiowarden::hwmon::SysfsHwmon;
use serial_test::serial;
use tempfile::TempDir;

struct Rig {
    dir: TempDir,
}

impl Rig {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("hwmon")).unwrap();
        Self { dir }
    }

    fn hwmon_root(&self) -> PathBuf {
        self.dir.path().join("hwmon")
    }

    fn chip(&self, entry: &str, name: &str, pwms: &[&str]) -> PathBuf {
        let chip = self.hwmon_root().join(entry);
        fs::create_dir(&chip).unwrap();
        fs::write(chip.join("name"), format!("{}\n", name)).unwrap();
        for pwm in pwms {
            fs::write(chip.join(pwm), "128\n").unwrap();
        }
        chip
    }

    fn args_file(&self) -> PathBuf {
        self.dir.path().join("controller.args")
    }

    fn log_file(&self) -> PathBuf {
        self.dir.path().join("aiowarden.log")
    }

    /// Controller stand-in: dumps one argument per line, then runs `tail`.
    fn config(&self, tail: &str) -> SupervisorConfig {
        let script = self.dir.path().join("controller.sh");
        fs::write(
            &script,
            format!("printf '%s\\n' \"$@\" > '{}'\n{}\n", self.args_file().display(), tail),
        )
        .unwrap();

        let mut cfg = SupervisorConfig::default();
        cfg.hwmon_root = self.hwmon_root();
        cfg.startup_delay_secs = 0;
        cfg.log_path = self.log_file();
        cfg.controller = ControllerSpec {
            program: "/bin/sh".to_string(),
            args: vec![script.display().to_string()],
        };
        cfg
    }

    fn received_args(&self) -> Option<Vec<String>> {
        let text = fs::read_to_string(self.args_file()).ok()?;
        Some(text.lines().map(str::to_string).collect())
    }
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).cloned()
}

fn path_str(p: &Path) -> String {
    p.display().to_string()
}

#[test]
fn test_full_chip_launches_with_pump_and_fan() {
    let rig = Rig::new();
    rig.chip("hwmon0", "it8688", &["pwm1", "pwm2", "pwm3"]);
    let chip = rig.chip("hwmon3", "nct6798", &["pwm1", "pwm2"]);
    let cfg = rig.config("exit 0");

    assert_eq!(run_supervisor(&cfg), 0);

    let args = rig.received_args().expect("controller ran");
    assert_eq!(value_after(&args, "--pump"), Some(path_str(&chip.join("pwm2"))));
    assert_eq!(value_after(&args, "--fans"), Some(path_str(&chip.join("pwm1"))));
    assert_eq!(value_after(&args, "--threshold").as_deref(), Some("70"));
    assert_eq!(value_after(&args, "--min-pump").as_deref(), Some("100"));
    assert_eq!(value_after(&args, "--max-pump").as_deref(), Some("255"));
    assert_eq!(value_after(&args, "--min-fan").as_deref(), Some("80"));
    assert_eq!(value_after(&args, "--max-fan").as_deref(), Some("255"));
}

#[test]
#[serial]
fn test_pump_only_chip_logs_degraded_mode() {
    let rig = Rig::new();
    let chip = rig.chip("hwmon1", "nct6798", &["pwm2"]);
    let cfg = rig.config("exit 0");

    logger::init_logging(&cfg.log_path);
    let code = run_supervisor(&cfg);
    logger::close_logging();
    assert_eq!(code, 0);

    let args = rig.received_args().expect("controller ran");
    assert_eq!(value_after(&args, "--pump"), Some(path_str(&chip.join("pwm2"))));
    assert!(!args.iter().any(|a| a == "--fans" || a == "--min-fan" || a == "--max-fan"));

    let log = fs::read_to_string(rig.log_file()).unwrap();
    let fan_line = log.lines().find(|l| l.contains("Fan PWM device not found")).expect("degraded line");
    assert!(fan_line.contains(" - INFO - "));
    assert!(log.contains("Controller invocation: /bin/sh"));
    assert!(log.contains("Controller exited cleanly"));
}

#[test]
#[serial]
fn test_missing_chip_exits_1_and_never_launches() {
    let rig = Rig::new();
    rig.chip("hwmon0", "it8688", &["pwm1", "pwm2"]);
    rig.chip("hwmon1", "k10temp", &[]);
    let cfg = rig.config("exit 0");

    logger::init_logging(&cfg.log_path);
    let code = run_supervisor(&cfg);
    logger::close_logging();

    assert_eq!(code, 1);
    assert!(rig.received_args().is_none());
    let log = fs::read_to_string(rig.log_file()).unwrap();
    assert!(log.contains(" - ERROR - hwmon chip 'nct6798' not found"));
}

#[test]
fn test_missing_pump_node_exits_1() {
    let rig = Rig::new();
    rig.chip("hwmon2", "nct6798", &["pwm1", "pwm3"]);
    let cfg = rig.config("exit 0");

    let source = SysfsHwmon::new(&cfg.hwmon_root);
    let mut sup = Supervisor::new(&cfg, &source);
    assert_eq!(sup.run(&mut CommandRunner::new()), 1);
    assert_eq!(sup.state(), SupervisorState::PumpDeviceMissing);
    assert!(rig.received_args().is_none());
}

#[test]
fn test_controller_exit_code_is_propagated() {
    let rig = Rig::new();
    rig.chip("hwmon3", "nct6798", &["pwm1", "pwm2"]);
    let cfg = rig.config("exit 7");

    assert_eq!(run_supervisor(&cfg), 7);
}

#[test]
fn test_controller_killed_by_signal() {
    let rig = Rig::new();
    rig.chip("hwmon3", "nct6798", &["pwm2"]);
    let cfg = rig.config("kill -TERM $$");

    assert_eq!(run_supervisor(&cfg), 128 + libc::SIGTERM);
}

#[test]
fn test_missing_controller_executable_exits_1() {
    let rig = Rig::new();
    rig.chip("hwmon3", "nct6798", &["pwm1", "pwm2"]);
    let mut cfg = rig.config("exit 0");
    cfg.controller.program = rig.dir.path().join("no-such-controller").display().to_string();
    cfg.controller.args.clear();

    let source = SysfsHwmon::new(&cfg.hwmon_root);
    let mut sup = Supervisor::new(&cfg, &source);
    assert_eq!(sup.run(&mut CommandRunner::new()), 1);
    assert_eq!(sup.state(), SupervisorState::Failed);
}

#[test]
fn test_optional_tunables_reach_controller() {
    let rig = Rig::new();
    rig.chip("hwmon3", "nct6798", &["pwm2"]);
    let mut cfg = rig.config("exit 0");
    cfg.interval_secs = Some(3);
    cfg.pwm_step = Some(15);
    cfg.thresholds.temp_threshold_c = 65;

    assert_eq!(run_supervisor(&cfg), 0);
    let args = rig.received_args().unwrap();
    assert_eq!(value_after(&args, "--interval").as_deref(), Some("3"));
    assert_eq!(value_after(&args, "--step").as_deref(), Some("15"));
    assert_eq!(value_after(&args, "--threshold").as_deref(), Some("65"));
}
