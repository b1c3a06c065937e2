//! Logging setup.
//!
//! Library crates log through `tracing` macros and never install a
//! subscriber themselves. Front-ends call [`init_logging`] once with the
//! level from their configuration.

use tracing::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn from_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("error") {
            LogLevel::Error
        } else if value.eq_ignore_ascii_case("warn") || value.eq_ignore_ascii_case("warning") {
            LogLevel::Warn
        } else if value.eq_ignore_ascii_case("debug") {
            LogLevel::Debug
        } else if value.eq_ignore_ascii_case("trace") {
            LogLevel::Trace
        } else {
            LogLevel::Info
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn to_tracing(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the process-wide fmt subscriber.
///
/// Returns `false` if a subscriber was already installed (tests, embedding
/// hosts); the existing one is left in place.
pub fn init_logging(level: LogLevel) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level.to_tracing())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_round_trip() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(LogLevel::from_str(level.as_str()), level);
        }
        assert_eq!(LogLevel::from_str("WARNING"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("nonsense"), LogLevel::Info);
    }

    #[test]
    fn levels_are_ordered_by_verbosity() {
        assert!(LogLevel::Error < LogLevel::Trace);
        assert_eq!(LogLevel::Debug.to_tracing(), Level::DEBUG);
    }

    #[test]
    fn second_init_is_rejected() {
        init_logging(LogLevel::Warn);
        assert!(!init_logging(LogLevel::Warn));
    }
}
