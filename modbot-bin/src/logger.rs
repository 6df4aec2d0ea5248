use chrono::Local;
use log::{Level, Log, Metadata, Record, SetLoggerError};
use modbot_core::config::Config;

pub fn init(config: &Config) -> Result<(), SetLoggerError> {
    log::set_logger(&Logger)?;
    log::set_max_level(config.loglevel);
    Ok(())
}

/// Prints records of the modbot crates to stdout.
pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("modbot")
    }

    fn log(&self, record: &Record) {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");

        if self.enabled(record.metadata()) {
            println!(
                "[{}] [{}] {}",
                now,
                match record.level() {
                    Level::Error => "ERROR",
                    Level::Warn => "WARN",
                    Level::Info => "INFO",
                    Level::Debug => "DEBUG",
                    Level::Trace => "TRACE",
                },
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::Logger;

    use log::{Level, Log, Metadata};

    #[test]
    fn test_enabled() {
        let metadata = |target| Metadata::builder().level(Level::Info).target(target).build();

        assert!(Logger.enabled(&metadata("modbot_core::manager")));
        assert!(Logger.enabled(&metadata("modbot")));
        assert!(!Logger.enabled(&metadata("serenity::gateway")));
    }
}
