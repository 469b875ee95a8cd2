// src/utils/logger.rs

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};
use std::io::Write;

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

/// Maps `-v` counts / `-q` to a level: warn by default, info, debug, trace.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
  if quiet {
    return LevelFilter::Error;
  }
  match verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  }
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
  log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

fn tag(level: Level) -> &'static str {
  match level {
    Level::Error => "ERROR",
    Level::Warn => "WARN ",
    Level::Info => "INFO ",
    Level::Debug => "DEBUG",
    Level::Trace => "TRACE",
  }
}

impl log::Log for StderrLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      // Format: "[WARN ] abihist::robot: File not found"
      let _ = writeln!(
        std::io::stderr().lock(),
        "[{}] {}: {}",
        tag(record.level()),
        record.target(),
        record.args()
      );
    }
  }

  fn flush(&self) {
    let _ = std::io::stderr().flush();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_levels() {
    assert_eq!(level_from_flags(0, false), LevelFilter::Warn);
    assert_eq!(level_from_flags(2, false), LevelFilter::Debug);
    assert_eq!(level_from_flags(9, false), LevelFilter::Trace);
    assert_eq!(level_from_flags(3, true), LevelFilter::Error);
  }
}
