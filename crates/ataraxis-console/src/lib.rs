//! Console facade: levelled terminal output, log files, progress bars and
//! error reporting behind one object.
//!
//! Each record is dispatched as a `tracing` event (target [`backend::TARGET`])
//! to a subscriber private to the console's backend, whose layers draw it on
//! the terminal and append it to the log files.
//!
//! ```no_run
//! use ataraxis_console::{Console, ConsoleConfig, ErrorKind, Level};
//!
//! fn run(console: &Console) -> Result<(), ataraxis_console::ConsoleError> {
//!     console.echo("starting", Level::Info);
//!     for _batch in console.track(0..10, "Processing", None, Some("batch")) {}
//!     console.error("unreachable state", ErrorKind::Runtime)
//! }
//!
//! let console = Console::new(ConsoleConfig::default()).unwrap();
//! console.enable();
//! let _ = run(&console);
//! ```

pub mod backend;
pub mod config;
mod error;
mod facade;
pub mod format;
mod global;
pub mod level;
pub mod progress;
pub mod sink;

pub use backend::{Backend, Record, Terminal};
pub use config::{BackendKind, ConsoleConfig, LogFormat, LogPaths, ensure_directory_exists};
pub use error::{ConsoleError, ErrorKind, UserError};
pub use facade::{Console, EnabledGuard};
pub use format::{HEADER_WIDTH, WrapOptions, format_message};
pub use global::{console, error_format};
pub use level::{Level, SinkCategory, Stream};
pub use progress::{ProgressBar, Track};
