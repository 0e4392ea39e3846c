//! Console logging. Nothing is logged until `init` is called with a level
//! other than `Off`.

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

// ISO 8601 timestamp and a colour coded level tag
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

/// Builds the configuration: one stderr appender so boards echoed to stdout
/// stay readable.
pub fn config(level: LevelFilter) -> Result<Config, log4rs::config::runtime::ConfigErrors> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
}

/// Installs the global logger. Does nothing for `LevelFilter::Off`.
pub fn init(level: LevelFilter) -> anyhow::Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }

    log4rs::init_config(config(level)?)?;
    log::debug!("logging at level {level}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builds_for_every_level() {
        for level in [
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
            LevelFilter::Trace,
        ] {
            let config = config(level).unwrap();
            assert_eq!(config.root().level(), level);
            assert_eq!(config.appenders().len(), 1);
        }
    }

    #[test]
    fn test_off_installs_nothing() {
        assert!(init(LevelFilter::Off).is_ok());
    }
}
