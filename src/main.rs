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

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use aiowarden::config::{config_path, load_config, SupervisorConfig};
use aiowarden::error::SupervisorError;
use aiowarden::hwmon::{enumerate_pwm_chips, SysfsHwmon};
use aiowarden::report::write_pwm_listing;
use aiowarden::supervisor::{run_supervisor, Supervisor};
use aiowarden::{logger, system};

#[derive(Parser, Debug)]
#[command(name = "aiowarden", version, about = "Find the nct6798 PWM nodes and supervise the AIO cooling controller")]
struct Cli {
    /// Config file (default: $AIOWARDEN_CONFIG or /etc/aiowarden/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also log debug lines
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip the root check (for testing against a fake hwmon tree)
    #[arg(long, global = true)]
    allow_unprivileged: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Locate the chip and launch the controller (default)
    Run,
    /// Locate the chip and print the controller command line without launching
    Check,
    /// List every PWM node under the hwmon root
    List,
}

fn load(cli: &Cli) -> SupervisorConfig {
    let path = config_path(cli.config.as_deref());
    match load_config(&path) {
        Ok(Some(cfg)) => cfg,
        Ok(None) => {
            logger::info(format!("No config at {}; using built-in defaults", path.display()));
            SupervisorConfig::default()
        }
        Err(e) => {
            logger::error(e.to_string());
            std::process::exit(e.exit_code());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::set_verbose(cli.verbose);
    let cfg = load(&cli);

    match cli.command.as_ref().unwrap_or(&Cmd::Run) {
        Cmd::List => {
            let chips = enumerate_pwm_chips(&cfg.hwmon_root);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_pwm_listing(&mut out, &chips)?;
            out.flush()?;
            Ok(())
        }
        Cmd::Check => {
            let source = SysfsHwmon::new(&cfg.hwmon_root);
            match Supervisor::new(&cfg, &source).prepare() {
                Ok(invocation) => {
                    println!("{}", invocation);
                    Ok(())
                }
                Err(e) => {
                    logger::error(e.to_string());
                    std::process::exit(e.exit_code());
                }
            }
        }
        Cmd::Run => {
            match logger::init_logging(&cfg.log_path) {
                Some(used) if used != cfg.log_path => {
                    logger::warn(format!("Cannot open {}; logging to {}", cfg.log_path.display(), used.display()));
                }
                Some(_) => {}
                None => {
                    logger::warn(format!("Cannot open log file {}; logging to stdout only", cfg.log_path.display()));
                }
            }
            if !cli.allow_unprivileged && !system::is_root() {
                let err = SupervisorError::PermissionDenied(
                    "this program must be run with administrator privileges".to_string(),
                );
                logger::error(err.to_string());
                logger::error(format!(
                    "Please run with: sudo {}",
                    std::env::args().next().unwrap_or_else(|| "aiowarden".to_string())
                ));
                std::process::exit(err.exit_code());
            }
            std::process::exit(run_supervisor(&cfg));
        }
    }
}
