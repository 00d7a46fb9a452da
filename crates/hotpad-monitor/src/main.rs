mod cli;
mod logging;
mod monitor;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::{select, tick, unbounded};
use hotpad::{DeviceList, Hotplug, RegistryEvent, SdlDriver, Settings};

use crate::cli::Cli;
use crate::monitor::Watcher;

/// How long motors stay on after a connect when `--rumble-test` is given.
const PULSE: Duration = Duration::from_millis(400);

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse { path: PathBuf, source: hotpad::Error },
}

fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let input = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    Settings::from_yaml(&input).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::setup(cli.verbose, cli.no_color) {
        #[allow(clippy::print_stderr)]
        eprintln!("unable to set up logger: {e}");
        return ExitCode::FAILURE;
    }

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            print_error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    print_debug!("settings: {settings:?}");

    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        print_error!("failed to set Ctrl+C handler: {e}");
        return ExitCode::FAILURE;
    }

    let registry = Arc::new(DeviceList::new());
    let events = registry.subscribe();
    let mut hotplug = Hotplug::new();
    hotplug.init(SdlDriver::start, Arc::clone(&registry), settings);
    if !hotplug.is_running() {
        print_error!("controller support is unavailable");
        return ExitCode::FAILURE;
    }
    registry.set_accepting(true);
    hotplug.populate_devices();

    let interval_ms = if cli.interval_ms == 0 {
        print_warning!("poll interval must be positive, using 1 ms");
        1
    } else {
        cli.interval_ms
    };
    let ticker = tick(Duration::from_millis(interval_ms));
    let mut watcher = Watcher::default();
    let mut pulse_until: Option<Instant> = None;
    print_info!("hotpad-monitor started. Waiting for controllers.");
    loop {
        select! {
            recv(stop_rx) -> _ => {
                break;
            }
            recv(events) -> msg => {
                match msg {
                    Ok(RegistryEvent::Added { name, preferred_id, .. }) => {
                        print_info!("{} {name}", "connected".green());
                        if cli.rumble_test {
                            registry.with_devices(|devices| {
                                monitor::set_motors(
                                    devices,
                                    |d| d.name() == name && d.preferred_id() == preferred_id,
                                    1.0,
                                );
                            });
                            pulse_until = Some(Instant::now() + PULSE);
                        }
                    }
                    Ok(RegistryEvent::Removed { name, .. }) => {
                        print_info!("{} {name}", "disconnected".red());
                    }
                    Err(err) => {
                        print_error!("registry channel closed: {err}");
                        break;
                    }
                }
            }
            recv(ticker) -> _ => {
                registry.update_inputs();
                if pulse_until.is_some_and(|until| Instant::now() >= until) {
                    pulse_until = None;
                    registry.with_devices(|devices| {
                        monitor::set_motors(devices, |_| true, 0.0);
                    });
                }
                let changes = registry
                    .with_devices(|devices| watcher.scan(devices))
                    .unwrap_or_default();
                for change in changes {
                    for input in &change.pressed {
                        print_debug!("{}: {} {input}", change.device, "+".bright_green());
                    }
                    for input in &change.released {
                        print_debug!("{}: - {input}", change.device);
                    }
                }
            }
        }
    }

    registry.set_accepting(false);
    hotplug.deinit();
    print_info!("hotpad-monitor stopped");
    ExitCode::SUCCESS
}
