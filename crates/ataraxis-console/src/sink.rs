//! Append-only log files, written by a `tracing` layer per sink category.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{Event, Metadata, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::filter::Filtered;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, Filter, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::ConsoleError;
use crate::backend::event::{LoggedRecord, TARGET};
use crate::config::LogFormat;
use crate::level::{Level, SinkCategory};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Description of a file sink to register with a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSpec {
    pub category: SinkCategory,
    pub path: PathBuf,
    pub format: LogFormat,
    /// Write from a background thread instead of the caller's.
    pub enqueue: bool,
}

/// Formats a record time the way record headers show it.
pub fn timestamp(time: &DateTime<Local>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// `<timestamp> | <LEVEL>    | <text>`, unstyled.
pub fn header_line(time: &DateTime<Local>, level: Level, text: &str) -> String {
    format!("{} | {:<8} | {text}", timestamp(time), level.label())
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    time: String,
    level: Level,
    message: &'a str,
}

enum SinkWriter {
    Direct(Mutex<File>),
    Queued {
        writer: NonBlocking,
        _guard: WorkerGuard,
    },
}

struct FileSink {
    path: PathBuf,
    format: LogFormat,
    writer: SinkWriter,
}

impl FileSink {
    fn open(spec: &SinkSpec) -> Result<Self, ConsoleError> {
        if let Some(parent) = spec.path.parent() {
            crate::config::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&spec.path)
            .map_err(|e| ConsoleError::Io {
                path: spec.path.display().to_string(),
                source: e,
            })?;
        let writer = if spec.enqueue {
            // Blocking when the queue is full keeps every record.
            let (writer, guard) = NonBlockingBuilder::default()
                .lossy(false)
                .thread_name("ataraxis-log-writer")
                .finish(file);
            SinkWriter::Queued {
                writer,
                _guard: guard,
            }
        } else {
            SinkWriter::Direct(Mutex::new(file))
        };
        Ok(Self {
            path: spec.path.clone(),
            format: spec.format,
            writer,
        })
    }

    fn render(&self, record: &LoggedRecord) -> io::Result<String> {
        if self.format.is_json() {
            let json = JsonRecord {
                time: record.time.to_rfc3339(),
                level: record.level,
                message: &record.message,
            };
            serde_json::to_string(&json).map_err(io::Error::other)
        } else {
            Ok(header_line(&record.time, record.level, &record.text))
        }
    }

    fn write(&self, record: &LoggedRecord) -> io::Result<()> {
        let mut line = self.render(record)?;
        line.push('\n');
        match &self.writer {
            SinkWriter::Direct(file) => lock(file).write_all(line.as_bytes()),
            SinkWriter::Queued { writer, .. } => writer.make_writer().write_all(line.as_bytes()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

type Slot = Arc<Mutex<Vec<FileSink>>>;

/// Sink failures noticed while an event was being dispatched. They are
/// reported once the dispatch is over, since `tracing` drops events raised
/// from inside a subscriber.
#[derive(Clone, Default)]
pub(crate) struct Warnings(Arc<Mutex<Vec<String>>>);

impl Warnings {
    fn push(&self, warning: String) {
        lock(&self.0).push(warning);
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.0))
    }
}

/// Writes console events to the files of one category.
pub struct FileLayer {
    sinks: Slot,
    warnings: Warnings,
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(record) = LoggedRecord::from_event(event) else {
            return;
        };
        for sink in lock(&self.sinks).iter() {
            if let Err(e) = sink.write(&record) {
                self.warnings.push(format!(
                    "failed to write log record to {}: {e}",
                    sink.path.display()
                ));
            }
        }
    }
}

impl<S> Filter<S> for SinkCategory {
    fn enabled(&self, meta: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        meta.target() == TARGET && self.admits(meta.level())
    }
}

/// The file sinks of one backend, grouped by category.
#[derive(Default)]
pub(crate) struct SinkRegistry {
    debug: Slot,
    message: Slot,
    error: Slot,
    paths: Mutex<Vec<PathBuf>>,
}

impl SinkRegistry {
    fn slot(&self, category: SinkCategory) -> &Slot {
        match category {
            SinkCategory::Debug => &self.debug,
            SinkCategory::Message => &self.message,
            SinkCategory::Error => &self.error,
        }
    }

    /// The layer writing `category`'s files, filtered to its levels.
    pub(crate) fn layer<S>(
        &self,
        category: SinkCategory,
        warnings: &Warnings,
    ) -> Filtered<FileLayer, SinkCategory, S>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        FileLayer {
            sinks: Arc::clone(self.slot(category)),
            warnings: warnings.clone(),
        }
        .with_filter(category)
    }

    /// Opens and registers a sink. A path already registered is not opened twice.
    pub(crate) fn register(&self, spec: SinkSpec) -> Result<(), ConsoleError> {
        let mut paths = lock(&self.paths);
        if paths.iter().any(|p| p == &spec.path) {
            return Ok(());
        }
        let sink = FileSink::open(&spec)?;
        lock(self.slot(spec.category)).push(sink);
        paths.push(spec.path);
        Ok(())
    }
}
