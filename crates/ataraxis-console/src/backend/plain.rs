use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::pipeline::Pipeline;
use super::{Backend, LoggedRecord, Record, Terminal, level_style};
use crate::ConsoleError;
use crate::level::Stream;
use crate::sink::SinkSpec;

/// Writes the message alone to the terminal, coloured by level. Log files
/// still get the full `<timestamp> | <LEVEL> | <message>` record.
pub struct PlainBackend {
    terminal: Terminal,
    pipeline: Pipeline,
}

impl PlainBackend {
    pub fn new(terminal: Terminal) -> Self {
        Self {
            pipeline: Pipeline::new(PlainLayer {
                terminal: terminal.clone(),
            }),
            terminal,
        }
    }
}

struct PlainLayer {
    terminal: Terminal,
}

impl<S: Subscriber> Layer<S> for PlainLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Some(record) = LoggedRecord::from_event(event) {
            let line = self.terminal.paint(&level_style(record.level), &record.text);
            self.terminal.write_line(record.level.stream(), &line);
        }
    }
}

impl Backend for PlainBackend {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn header_width(&self) -> usize {
        0
    }

    fn log(&self, record: &Record<'_>) {
        self.pipeline.log(record);
    }

    fn write_raw(&self, stream: Stream, message: &str) {
        self.terminal.write_line(stream, message);
    }

    fn register_sink(&self, spec: SinkSpec) -> Result<(), ConsoleError> {
        self.pipeline.register_sink(spec)
    }
}
