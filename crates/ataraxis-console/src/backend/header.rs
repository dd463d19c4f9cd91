use console::Style;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::pipeline::Pipeline;
use super::{Backend, LoggedRecord, Record, Terminal, level_style};
use crate::ConsoleError;
use crate::format::HEADER_WIDTH;
use crate::level::Stream;
use crate::sink::{SinkSpec, timestamp};

/// Prefixes every record with `<timestamp> | <LEVEL> | `.
pub struct HeaderBackend {
    terminal: Terminal,
    pipeline: Pipeline,
}

impl HeaderBackend {
    pub fn new(terminal: Terminal) -> Self {
        Self {
            pipeline: Pipeline::new(HeaderLayer {
                terminal: terminal.clone(),
            }),
            terminal,
        }
    }
}

struct HeaderLayer {
    terminal: Terminal,
}

impl<S: Subscriber> Layer<S> for HeaderLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(record) = LoggedRecord::from_event(event) else {
            return;
        };
        let stream = record.level.stream();
        let time_style = match stream {
            Stream::Stderr => Style::new().green().for_stderr(),
            Stream::Stdout => Style::new().green(),
        };
        let line = format!(
            "{} | {} | {}",
            self.terminal.paint(&time_style, &timestamp(&record.time)),
            self.terminal
                .paint(&level_style(record.level), &format!("{:<8}", record.level.label())),
            record.text
        );
        self.terminal.write_line(stream, &line);
    }
}

impl Backend for HeaderBackend {
    fn name(&self) -> &'static str {
        "header"
    }

    fn header_width(&self) -> usize {
        HEADER_WIDTH
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
