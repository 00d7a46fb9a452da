//! Console output of the monitor.
//!
//! Every line carries a local timestamp. Connect and disconnect lines are
//! colored by the caller; the severity color is applied here.

use fern::Dispatch;

/// Prefix a line with the local time.
pub(crate) fn stamp(line: &str) -> String {
    let now = chrono::Local::now().format("%Y.%m.%d %H:%M:%S");
    format!("[{now}] {line}")
}

/// Failures that end the monitor, in red.
#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        log::error!("{}", $crate::logging::stamp(&format!($($arg)*)).bright_red())
    };
}

/// Device changes and lifecycle lines, uncolored.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        log::info!("{}", $crate::logging::stamp(&format!($($arg)*)))
    };
}

/// Input changes and settings dumps, shown with `--verbose` only.
#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => {
        log::debug!("{}", $crate::logging::stamp(&format!($($arg)*)).dimmed())
    };
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        log::warn!("{}", $crate::logging::stamp(&format!($($arg)*)).bright_yellow())
    };
}

/// Setup the logger. Records from the library are stamped here, the
/// monitor's own records arrive already stamped by the `print_*` macros.
pub(crate) fn setup(verbose: bool, no_color: bool) -> Result<(), log::SetLoggerError> {
    let log_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    Dispatch::new()
        .format(|out, message, record| {
            if record.target().starts_with("hotpad_monitor") {
                out.finish(format_args!("{message}"));
            } else {
                let line = stamp(&format!("{}: {message}", record.target()));
                out.finish(format_args!("{line}"));
            }
        })
        .level(log::LevelFilter::Error)
        .level_for("hotpad", log_level)
        .level_for("hotpad_monitor", log_level)
        .chain(std::io::stdout())
        .apply()?;

    if no_color {
        colored::control::set_override(false);
    }
    Ok(())
}
