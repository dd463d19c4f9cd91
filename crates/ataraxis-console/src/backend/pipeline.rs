use tracing::Dispatch;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Layer, SubscriberExt};

use super::Record;
use super::event::emit;
use crate::ConsoleError;
use crate::level::SinkCategory;
use crate::sink::{SinkRegistry, SinkSpec, Warnings};

/// A backend's private `tracing` subscriber: one terminal layer plus a
/// filtered file layer per sink category.
///
/// Records are dispatched here only, never to the process-wide default, so a
/// console does not interfere with whatever subscriber the host installs.
pub(crate) struct Pipeline {
    dispatch: Dispatch,
    sinks: SinkRegistry,
    warnings: Warnings,
}

impl Pipeline {
    pub(crate) fn new<L>(terminal: L) -> Self
    where
        L: Layer<Registry> + Send + Sync + 'static,
    {
        let sinks = SinkRegistry::default();
        let warnings = Warnings::default();
        let subscriber = tracing_subscriber::registry()
            .with(terminal)
            .with(sinks.layer(SinkCategory::Debug, &warnings))
            .with(sinks.layer(SinkCategory::Message, &warnings))
            .with(sinks.layer(SinkCategory::Error, &warnings));
        Self {
            dispatch: Dispatch::new(subscriber),
            sinks,
            warnings,
        }
    }

    pub(crate) fn log(&self, record: &Record<'_>) {
        tracing::dispatcher::with_default(&self.dispatch, || emit(record));
        for warning in self.warnings.take() {
            tracing::warn!("{warning}");
        }
    }

    pub(crate) fn register_sink(&self, spec: SinkSpec) -> Result<(), ConsoleError> {
        self.sinks.register(spec)
    }
}
