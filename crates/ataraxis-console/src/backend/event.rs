//! Console records as `tracing` events.
//!
//! A record is emitted at the matching `tracing` level with three fields
//! next to the message: `severity` (the console level name), `time`
//! (microseconds since the epoch) and `text` (the wrapped body). Layers turn
//! the event back into a [`LoggedRecord`].

use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use tracing::Event;
use tracing::field::{Field, Visit};

use super::Record;
use crate::level::Level;

/// Target of every event a console emits.
pub const TARGET: &str = "ataraxis_console";

/// Emits `record` to the current default dispatcher.
pub(crate) fn emit(record: &Record<'_>) {
    macro_rules! emit_at {
        ($level:expr) => {
            tracing::event!(
                target: TARGET,
                $level,
                severity = record.level.as_str(),
                time = record.time.timestamp_micros(),
                text = record.text,
                "{}",
                record.message
            )
        };
    }

    match record.level {
        Level::Debug => emit_at!(tracing::Level::DEBUG),
        Level::Info | Level::Success => emit_at!(tracing::Level::INFO),
        Level::Warning => emit_at!(tracing::Level::WARN),
        Level::Error | Level::Critical => emit_at!(tracing::Level::ERROR),
    }
}

/// A record rebuilt from a console event.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedRecord {
    pub level: Level,
    pub time: DateTime<Local>,
    pub message: String,
    pub text: String,
}

impl LoggedRecord {
    /// `None` for events that did not come from a console.
    pub fn from_event(event: &Event<'_>) -> Option<Self> {
        if event.metadata().target() != TARGET {
            return None;
        }
        let mut fields = RecordFields::default();
        event.record(&mut fields);

        let level = fields.severity?;
        let time = fields
            .time
            .and_then(|micros| Local.timestamp_micros(micros).single())
            .unwrap_or_else(Local::now);
        let text = fields.text.unwrap_or_else(|| fields.message.clone());
        Some(Self {
            level,
            time,
            message: fields.message,
            text,
        })
    }
}

#[derive(Default)]
struct RecordFields {
    severity: Option<Level>,
    time: Option<i64>,
    text: Option<String>,
    message: String,
}

impl Visit for RecordFields {
    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == "time" {
            self.time = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "severity" => self.severity = value.parse().ok(),
            "text" => self.text = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
