use chrono::{Local, NaiveTime};
use env_logger::{Builder, Env, Target};
use log::{Level, SetLoggerError};
use std::fmt::Arguments;
use std::io::Write;

/// Install the process logger writing `LEVEL: hh:mm:ss.zzz: message` lines
/// to stdout. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) -> Result<(), SetLoggerError> {
    let default_filter = if verbose { "debug" } else { "info" };

    Builder::from_env(Env::default().default_filter_or(default_filter))
        .target(Target::Stdout)
        .format(|buf, record| {
            let line = format_line(record.level(), Local::now().time(), record.args());
            writeln!(buf, "{line}")
        })
        .try_init()
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "CRITICAL",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug | Level::Trace => "DEBUG",
    }
}

fn format_line(level: Level, time: NaiveTime, message: &Arguments<'_>) -> String {
    format!(
        "{}: {}: {message}",
        level_label(level),
        time.format("%H:%M:%S%.3f")
    )
}
