use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::ConsoleError;

/// Message severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

/// Terminal stream a level is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Which of the three log files a level is persisted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkCategory {
    Debug,
    Message,
    Error,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Debug,
        Level::Info,
        Level::Success,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }

    /// Upper-case label used in record headers.
    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    pub fn stream(self) -> Stream {
        match self {
            Level::Error | Level::Critical => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }

    /// The `tracing` level a record of this severity is emitted at. `Success`
    /// shares `INFO` and `Critical` shares `ERROR`; the exact severity travels
    /// as an event field.
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info | Level::Success => tracing::Level::INFO,
            Level::Warning => tracing::Level::WARN,
            Level::Error | Level::Critical => tracing::Level::ERROR,
        }
    }

    pub fn category(self) -> SinkCategory {
        match self {
            Level::Debug => SinkCategory::Debug,
            Level::Info | Level::Success | Level::Warning => SinkCategory::Message,
            Level::Error | Level::Critical => SinkCategory::Error,
        }
    }
}

impl SinkCategory {
    pub const ALL: [SinkCategory; 3] = [
        SinkCategory::Debug,
        SinkCategory::Message,
        SinkCategory::Error,
    ];

    /// File stem of the log file holding this category.
    pub fn file_stem(self) -> &'static str {
        match self {
            SinkCategory::Debug => "debug",
            SinkCategory::Message => "message",
            SinkCategory::Error => "error",
        }
    }

    pub fn accepts(self, level: Level) -> bool {
        level.category() == self
    }

    /// Whether events at the `tracing` level can belong to this category.
    pub fn admits(self, level: &tracing::Level) -> bool {
        match self {
            SinkCategory::Debug => *level == tracing::Level::DEBUG,
            SinkCategory::Message => *level == tracing::Level::INFO || *level == tracing::Level::WARN,
            SinkCategory::Error => *level == tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConsoleError::InvalidLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_severity() {
        let mut sorted = Level::ALL;
        sorted.sort();
        assert_eq!(sorted, Level::ALL);
        assert!(Level::Debug < Level::Critical);
    }

    #[test]
    fn error_levels_route_to_stderr() {
        for level in Level::ALL {
            let expected = if matches!(level, Level::Error | Level::Critical) {
                Stream::Stderr
            } else {
                Stream::Stdout
            };
            assert_eq!(level.stream(), expected, "{level}");
        }
    }

    #[test]
    fn categories_partition_levels() {
        assert_eq!(Level::Debug.category(), SinkCategory::Debug);
        assert_eq!(Level::Success.category(), SinkCategory::Message);
        assert_eq!(Level::Warning.category(), SinkCategory::Message);
        assert_eq!(Level::Critical.category(), SinkCategory::Error);
        for level in Level::ALL {
            let accepting = SinkCategory::ALL
                .into_iter()
                .filter(|c| c.accepts(level))
                .count();
            assert_eq!(accepting, 1);
        }
    }

    #[test]
    fn tracing_levels_agree_with_categories() {
        for level in Level::ALL {
            for category in SinkCategory::ALL {
                assert_eq!(
                    category.admits(&level.tracing_level()),
                    category.accepts(level),
                    "{level} / {category:?}"
                );
            }
        }
        assert!(!SinkCategory::Message.admits(&tracing::Level::TRACE));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("CRITICAL".parse::<Level>().unwrap(), Level::Critical);
        assert_eq!(" Success ".parse::<Level>().unwrap(), Level::Success);
    }

    #[test]
    fn parse_rejects_unknown_level() {
        let err = "INVALID_LEVEL".parse::<Level>().unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidLevel(ref s) if s == "INVALID_LEVEL"));
        assert!(err.to_string().contains("Unable to echo the requested message"));
    }

    #[test]
    fn label_fits_header_column() {
        for level in Level::ALL {
            assert!(level.label().len() <= 8);
        }
    }
}
