use ataraxis_console::backend::{self, Terminal};
use ataraxis_console::{BackendKind, Console, ConsoleConfig};

/// Short single-line message.
pub const SHORT_MSG: &str = "Runtime initialized.";

/// One paragraph, wraps to a few lines at the default width.
pub const PARAGRAPH_MSG: &str = "The acquisition runtime started the camera, microcontroller and video \
    encoder processes and is now waiting for the first frame to arrive before it begins saving data to \
    the output directory configured for this session.";

/// Several paragraphs separated by hard line breaks.
pub fn long_msg() -> String {
    [PARAGRAPH_MSG; 8].join("\n")
}

/// An enabled console whose terminal output is discarded.
pub fn sink_console(kind: BackendKind) -> Console {
    let config = ConsoleConfig {
        backend: kind,
        ..ConsoleConfig::default()
    };
    let terminal = Terminal::from_writers(std::io::sink(), std::io::sink());
    let console = Console::with_backend(config, backend::build(kind, terminal))
        .expect("default config is valid");
    console.enable();
    console
}
