use std::sync::LazyLock;

use crate::Console;

static CONSOLE: LazyLock<Console> = LazyLock::new(Console::default);

/// The process-wide console.
///
/// Built on first use with default settings: disabled, no log files, 120
/// column lines. Libraries report through it so that an application only has
/// to call `console().enable()` to see their output. Prefer passing a
/// `&Console` explicitly where the caller controls construction.
pub fn console() -> &'static Console {
    &CONSOLE
}

/// Formats `message` the way the global console wraps error payloads, without
/// a record header. Useful for comparing against error messages in tests.
pub fn error_format(message: &str) -> String {
    console().format_message(message, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_console_defaults() {
        let console = console();
        assert_eq!(console.line_width(), 120);
        assert!(console.debug_log_path().is_none());
        assert!(console.message_log_path().is_none());
        assert!(console.error_log_path().is_none());
        assert!(!console.progress_enabled());
    }

    #[test]
    fn global_console_is_shared() {
        assert!(std::ptr::eq(console(), console()));
    }

    #[test]
    fn error_format_matches_global_wrapping() {
        let message = "word ".repeat(60);
        let formatted = error_format(&message);
        assert!(formatted.lines().all(|l| l.len() <= 120));
        assert_eq!(formatted, console().format_message(&message, false));
        assert_eq!(error_format("short"), "short");
    }
}
