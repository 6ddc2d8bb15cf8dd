//! Stderr backend for the `log` facade.

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes log records to stderr.
///
/// Info and above print the bare message; debug mode prefixes every line with
/// its level and module so gphoto2 invocations can be traced.
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(debug: bool) -> Self {
        Self {
            level: if debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    fn format(&self, record: &Record) -> String {
        if self.level >= LevelFilter::Debug {
            format!(
                "{} {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else if record.level() <= Level::Warn {
            format!("{}: {}", record.level(), record.args())
        } else {
            record.args().to_string()
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", self.format(record));
        }
    }

    fn flush(&self) {}
}

/// Install the stderr logger as the global `log` backend.
///
/// This should be called once at program startup.
pub fn init(debug: bool) -> Result<(), log::SetLoggerError> {
    let logger: &'static StderrLogger = Box::leak(Box::new(StderrLogger::new(debug)));
    log::set_logger(logger)?;
    log::set_max_level(logger.level());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_line(logger: &StderrLogger, level: Level, message: &str) -> String {
        logger.format(
            &Record::builder()
                .level(level)
                .target("hdr_bracket::session")
                .args(format_args!("{}", message))
                .build(),
        )
    }

    #[test]
    fn test_levels() {
        assert_eq!(StderrLogger::new(false).level(), LevelFilter::Info);
        assert_eq!(StderrLogger::new(true).level(), LevelFilter::Debug);
    }

    #[test]
    fn test_enabled() {
        let logger = StderrLogger::new(false);
        let debug = Metadata::builder().level(Level::Debug).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&info));
    }

    #[test]
    fn test_format_plain() {
        let logger = StderrLogger::new(false);
        assert_eq!(
            record_line(&logger, Level::Info, "3 brackets captured"),
            "3 brackets captured"
        );
        assert_eq!(
            record_line(&logger, Level::Warn, "2 out of 9 discarded"),
            "WARN: 2 out of 9 discarded"
        );
    }

    #[test]
    fn test_format_debug() {
        let logger = StderrLogger::new(true);
        assert_eq!(
            record_line(&logger, Level::Info, "Current Values:"),
            "INFO hdr_bracket::session: Current Values:"
        );
    }
}
