//! Logging backends.
//!
//! A backend turns each record into a `tracing` event dispatched to its own
//! subscriber. The terminal layer decides how the record looks on screen;
//! file layers, shared by both backends, persist it. The console only formats
//! the message body and picks the level; everything else goes through
//! [`Backend`].

pub mod event;
mod header;
mod pipeline;
mod plain;

pub use event::{LoggedRecord, TARGET};
pub use header::HeaderBackend;
pub use plain::PlainBackend;

use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use console::{Style, Term};

use crate::ConsoleError;
use crate::config::BackendKind;
use crate::level::{Level, Stream};
use crate::sink::SinkSpec;

/// One log call as seen by a backend.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: Level,
    pub time: DateTime<Local>,
    /// The caller's message, unwrapped.
    pub message: &'a str,
    /// The message wrapped for this backend's header width.
    pub text: &'a str,
}

impl<'a> Record<'a> {
    pub fn now(level: Level, message: &'a str, text: &'a str) -> Self {
        Self {
            level,
            time: Local::now(),
            message,
            text,
        }
    }
}

/// Formatting, routing and persistence capability used by the console.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Columns the backend prepends to the first line of every record.
    fn header_width(&self) -> usize;

    /// Writes a record to the level's terminal stream and to every registered
    /// sink of the level's category.
    fn log(&self, record: &Record<'_>);

    /// Writes `message` and a newline to `stream`, bypassing formatting and sinks.
    fn write_raw(&self, stream: Stream, message: &str);

    fn register_sink(&self, spec: SinkSpec) -> Result<(), ConsoleError>;
}

/// Builds the stock backend for `kind`, writing to `terminal`.
pub fn build(kind: BackendKind, terminal: Terminal) -> Box<dyn Backend> {
    match kind {
        BackendKind::Header => Box::new(HeaderBackend::new(terminal)),
        BackendKind::Plain => Box::new(PlainBackend::new(terminal)),
    }
}

type BoxedWriter = Box<dyn Write + Send>;

/// The pair of output streams a backend writes to. Clones share the streams.
#[derive(Clone)]
pub struct Terminal {
    out: Arc<Mutex<BoxedWriter>>,
    err: Arc<Mutex<BoxedWriter>>,
    styled: bool,
}

impl Terminal {
    /// Process stdout and stderr. Colour follows the `console` crate's terminal detection.
    pub fn stdio() -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(Term::stdout()))),
            err: Arc::new(Mutex::new(Box::new(Term::stderr()))),
            styled: true,
        }
    }

    /// Arbitrary writers, never styled.
    pub fn from_writers(out: impl Write + Send + 'static, err: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
            err: Arc::new(Mutex::new(Box::new(err))),
            styled: false,
        }
    }

    pub fn write_line(&self, stream: Stream, line: &str) {
        let writer = match stream {
            Stream::Stdout => &self.out,
            Stream::Stderr => &self.err,
        };
        let mut writer = writer.lock().unwrap_or_else(|e| e.into_inner());
        // A closed terminal stream is not worth failing a log call over.
        let _ = writeln!(writer, "{line}");
        let _ = writer.flush();
    }

    /// Applies `style` to `text` when this terminal is styled.
    pub fn paint(&self, style: &Style, text: &str) -> String {
        if self.styled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Colour of a level's label on its stream.
pub fn level_style(level: Level) -> Style {
    let style = match level {
        Level::Debug => Style::new().blue().bold(),
        Level::Info => Style::new().bold(),
        Level::Success => Style::new().green().bold(),
        Level::Warning => Style::new().yellow().bold(),
        Level::Error => Style::new().red().bold(),
        Level::Critical => Style::new().white().on_red().bold(),
    };
    match level.stream() {
        Stream::Stderr => style.for_stderr(),
        Stream::Stdout => style,
    }
}
