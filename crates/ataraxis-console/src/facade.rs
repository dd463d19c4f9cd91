use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::backend::{self, Backend, Record, Terminal};
use crate::config::{ConsoleConfig, LogFormat, LogPaths, create_dir_all};
use crate::error::{ConsoleError, ErrorKind, UserError};
use crate::format::{WrapOptions, format_message};
use crate::level::{Level, SinkCategory};
use crate::progress::{ProgressBar, Track, exact_len};
use crate::sink::SinkSpec;

/// Central point for terminal output, log files, progress bars and error reporting.
///
/// A console starts disabled: `echo` is a no-op and `error` returns its error
/// without writing anything until [`enable`](Self::enable) is called. Progress
/// display is gated separately by [`enable_progress`](Self::enable_progress).
///
/// The enable flags may be toggled from any thread, but concurrent toggles are
/// not ordered with respect to each other; callers needing that must serialize.
pub struct Console {
    enabled: AtomicBool,
    progress_enabled: AtomicBool,
    has_handles: Mutex<bool>,
    wrap: WrapOptions,
    debug: bool,
    enqueue: bool,
    log_format: LogFormat,
    paths: Option<LogPaths>,
    backend: Box<dyn Backend>,
}

impl Console {
    /// Builds a console writing to the process stdout/stderr.
    ///
    /// The log directory is created if missing and the log files are opened
    /// here; they are appended to for the life of the console.
    pub fn new(config: ConsoleConfig) -> Result<Self, ConsoleError> {
        let backend = backend::build(config.backend, Terminal::stdio());
        Self::with_backend(config, backend)
    }

    /// Builds a console around a caller-supplied backend.
    pub fn with_backend(config: ConsoleConfig, backend: Box<dyn Backend>) -> Result<Self, ConsoleError> {
        config.validate()?;
        let paths = match &config.log_directory {
            Some(dir) => {
                create_dir_all(dir)?;
                Some(LogPaths::new(dir, config.log_format))
            }
            None => None,
        };
        let console = Self {
            enabled: AtomicBool::new(false),
            progress_enabled: AtomicBool::new(config.show_progress),
            has_handles: Mutex::new(false),
            wrap: config.wrap_options(),
            debug: config.debug,
            enqueue: config.enqueue,
            log_format: config.log_format,
            paths,
            backend,
        };
        console.add_handles()?;
        Ok(console)
    }

    /// Registers the configured log files with the backend. Idempotent.
    ///
    /// The debug file is only registered when the console was built with `debug`.
    pub fn add_handles(&self) -> Result<(), ConsoleError> {
        let mut has_handles = self.has_handles.lock().unwrap_or_else(|e| e.into_inner());
        if *has_handles {
            return Ok(());
        }
        if let Some(paths) = &self.paths {
            for category in SinkCategory::ALL {
                if category == SinkCategory::Debug && !self.debug {
                    continue;
                }
                self.backend.register_sink(SinkSpec {
                    category,
                    path: paths.get(category).to_path_buf(),
                    format: self.log_format,
                    enqueue: self.enqueue,
                })?;
            }
        }
        *has_handles = true;
        Ok(())
    }

    pub fn has_handles(&self) -> bool {
        *self.has_handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn progress_enabled(&self) -> bool {
        self.progress_enabled.load(Ordering::Relaxed)
    }

    /// Affects bars created after the call; existing bars keep their display mode.
    pub fn enable_progress(&self) {
        self.progress_enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable_progress(&self) {
        self.progress_enabled.store(false, Ordering::Relaxed);
    }

    /// Forces the console on until the returned guard drops, then restores
    /// the previous state, including when unwinding.
    pub fn temporarily_enabled(&self) -> EnabledGuard<'_> {
        let previous = self.enabled.swap(true, Ordering::Relaxed);
        EnabledGuard {
            console: self,
            previous,
        }
    }

    pub fn line_width(&self) -> usize {
        self.wrap.line_width
    }

    pub fn wrap_options(&self) -> WrapOptions {
        self.wrap
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn debug_log_path(&self) -> Option<&Path> {
        self.paths.as_ref().map(|p| p.debug.as_path())
    }

    pub fn message_log_path(&self) -> Option<&Path> {
        self.paths.as_ref().map(|p| p.message.as_path())
    }

    pub fn error_log_path(&self) -> Option<&Path> {
        self.paths.as_ref().map(|p| p.error.as_path())
    }

    /// Wraps `message` with this console's settings. With `with_header`, the
    /// first line leaves room for the backend's record header and later lines
    /// are indented to match.
    pub fn format_message(&self, message: &str, with_header: bool) -> String {
        let offset = if with_header {
            self.backend.header_width()
        } else {
            0
        };
        format_message(message, &self.wrap.with_header_offset(offset))
    }

    /// Logs `message` at `level`. No-op while disabled.
    pub fn echo(&self, message: &str, level: Level) {
        if !self.enabled() || (level == Level::Debug && !self.debug) {
            return;
        }
        let text = self.format_message(message, true);
        self.backend.log(&Record::now(level, message, &text));
    }

    /// Writes `message` verbatim to `level`'s stream: no wrapping, header or log file.
    pub fn echo_raw(&self, message: &str, level: Level) {
        if !self.enabled() {
            return;
        }
        self.backend.write_raw(level.stream(), message);
    }

    /// Like [`echo`](Self::echo) / [`echo_raw`](Self::echo_raw) with the level
    /// given by name. Unknown names fail with [`ConsoleError::InvalidLevel`]
    /// when the console is enabled.
    pub fn echo_named(&self, message: &str, level: &str, raw: bool) -> Result<(), ConsoleError> {
        if !self.enabled() {
            return Ok(());
        }
        let level: Level = level.parse()?;
        if raw {
            self.echo_raw(message, level);
        } else {
            self.echo(message, level);
        }
        Ok(())
    }

    /// Logs `message` at error level (when enabled) and returns it as an error
    /// of the requested kind.
    ///
    /// ```ignore
    /// if chunk_size < 1 {
    ///     return console.error(format!("chunk size must be positive, got {chunk_size}"), ErrorKind::Value);
    /// }
    /// ```
    pub fn error<T>(&self, message: impl Into<String>, kind: ErrorKind) -> Result<T, ConsoleError> {
        let message = message.into();
        self.report(&message);
        Err(UserError::new(kind, message).into())
    }

    /// Logs `message` at error level without failing. No-op while disabled.
    pub fn report(&self, message: &str) {
        if !self.enabled() {
            return;
        }
        let text = self.format_message(message, true);
        self.backend.log(&Record::now(Level::Error, message, &text));
    }

    /// Wraps `iterable`, advancing a progress bar per item.
    ///
    /// Items are yielded unchanged whatever the console state; the bar is only
    /// drawn when both the console and progress display are enabled. `total`
    /// defaults to the iterator's exact length when known.
    pub fn track<I>(
        &self,
        iterable: I,
        description: &str,
        total: Option<f64>,
        unit: Option<&str>,
    ) -> Track<I::IntoIter>
    where
        I: IntoIterator,
    {
        let iter = iterable.into_iter();
        let total = total.or_else(|| exact_len(&iter).map(|n| n as f64));
        Track::new(iter, self.new_bar(total, description, unit))
    }

    /// A manually driven progress bar, closed when dropped.
    pub fn progress(&self, total: f64, description: &str, unit: Option<&str>) -> ProgressBar {
        self.new_bar(Some(total), description, unit)
    }

    /// Runs `f` with a progress bar that is closed however `f` exits.
    pub fn with_progress<R>(
        &self,
        total: f64,
        description: &str,
        unit: Option<&str>,
        f: impl FnOnce(&mut ProgressBar) -> R,
    ) -> R {
        let mut bar = self.progress(total, description, unit);
        let result = f(&mut bar);
        bar.close();
        result
    }

    fn new_bar(&self, total: Option<f64>, description: &str, unit: Option<&str>) -> ProgressBar {
        let visible = self.enabled() && self.progress_enabled();
        ProgressBar::new(total, description, unit, visible)
    }
}

impl Default for Console {
    /// A disabled console with default wrapping and no log files.
    fn default() -> Self {
        let config = ConsoleConfig::default();
        Self {
            enabled: AtomicBool::new(false),
            progress_enabled: AtomicBool::new(config.show_progress),
            has_handles: Mutex::new(true),
            wrap: config.wrap_options(),
            debug: config.debug,
            enqueue: config.enqueue,
            log_format: config.log_format,
            paths: None,
            backend: backend::build(config.backend, Terminal::stdio()),
        }
    }
}

impl fmt::Display for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Console(enabled={}, progress_enabled={}, line_width={}, backend={}, has_handles={})",
            self.enabled(),
            self.progress_enabled(),
            self.wrap.line_width,
            self.backend.name(),
            self.has_handles()
        )
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("enabled", &self.enabled())
            .field("progress_enabled", &self.progress_enabled())
            .field("wrap", &self.wrap)
            .field("debug", &self.debug)
            .field("enqueue", &self.enqueue)
            .field("paths", &self.paths)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Restores the console's previous enabled state on drop.
#[must_use = "the console is only force-enabled while the guard is alive"]
pub struct EnabledGuard<'a> {
    console: &'a Console,
    previous: bool,
}

impl Drop for EnabledGuard<'_> {
    fn drop(&mut self) {
        self.console.enabled.store(self.previous, Ordering::Relaxed);
    }
}
