use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Misconfigured caller: bad constructor or config input.
    #[error("{0}")]
    InvalidArgument(String),
    #[error(
        "Unable to echo the requested message. Expected one of debug, info, success, warning, error or critical, but encountered '{0}'."
    )]
    InvalidLevel(String),
    #[error(transparent)]
    User(#[from] UserError),
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse console config: {0}")]
    Parse(String),
}

/// Failure kind requested by the caller of [`Console::error`](crate::Console::error).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorKind {
    #[default]
    Runtime,
    Value,
    Type,
    Lookup,
    Io,
    Other(&'static str),
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Lookup => "LookupError",
            ErrorKind::Io => "IoError",
            ErrorKind::Other(name) => name,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error raised through the console, carrying the caller's message unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UserError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UserError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl ConsoleError {
    /// The user error carried by this error, if it was raised through the console.
    pub fn as_user(&self) -> Option<&UserError> {
        match self {
            ConsoleError::User(e) => Some(e),
            _ => None,
        }
    }
}
