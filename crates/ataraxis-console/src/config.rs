use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::ConsoleError;
use crate::format::{DEFAULT_LINE_WIDTH, WrapOptions};
use crate::level::SinkCategory;

/// On-disk format of the log files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum LogFormat {
    #[default]
    Log,
    Txt,
    Json,
}

impl LogFormat {
    pub const ALL: [LogFormat; 3] = [LogFormat::Log, LogFormat::Txt, LogFormat::Json];

    /// File suffix including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            LogFormat::Log => ".log",
            LogFormat::Txt => ".txt",
            LogFormat::Json => ".json",
        }
    }

    pub fn is_json(self) -> bool {
        self == LogFormat::Json
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for LogFormat {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s.trim();
        let bare = suffix.strip_prefix('.').unwrap_or(suffix);
        LogFormat::ALL
            .into_iter()
            .find(|format| format.suffix()[1..].eq_ignore_ascii_case(bare))
            .ok_or_else(|| {
                ConsoleError::InvalidArgument(format!(
                    "Invalid 'log_format' argument encountered when initializing Console. Expected one of .log, .txt \
                     or .json, but encountered '{s}'."
                ))
            })
    }
}

impl TryFrom<String> for LogFormat {
    type Error = ConsoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Selects the logging backend used by a console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Timestamp and level header in front of every record.
    #[default]
    Header,
    /// Styled message text only.
    Plain,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Header => "header",
            BackendKind::Plain => "plain",
        })
    }
}

impl FromStr for BackendKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(BackendKind::Header),
            "plain" => Ok(BackendKind::Plain),
            _ => Err(ConsoleError::InvalidArgument(format!(
                "Invalid 'backend' argument encountered when initializing Console. Expected 'header' or 'plain', \
                 but encountered '{s}'."
            ))),
        }
    }
}

/// Construction-time console settings.
///
/// Loadable from TOML, either at the top level or under a `[console]` table:
///
/// ```toml
/// [console]
/// line_width = 100
/// log_directory = "logs"
/// log_format = ".json"
/// debug = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub line_width: usize,
    pub break_long_words: bool,
    pub break_on_hyphens: bool,
    /// Directory receiving `debug`, `message` and `error` log files. Created if missing.
    pub log_directory: Option<PathBuf>,
    pub log_format: LogFormat,
    /// Show and persist debug-level records.
    pub debug: bool,
    /// Write log files from background threads.
    pub enqueue: bool,
    /// Initial value of the progress display flag.
    pub show_progress: bool,
    pub backend: BackendKind,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            break_long_words: false,
            break_on_hyphens: false,
            log_directory: None,
            log_format: LogFormat::default(),
            debug: false,
            enqueue: false,
            show_progress: false,
            backend: BackendKind::default(),
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    console: ConsoleConfig,
}

impl ConsoleConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConsoleError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConsoleError::Parse(e.to_string()))?;
        let config = if table.contains_key("console") {
            let file: ConfigFile =
                toml::from_str(content).map_err(|e| ConsoleError::Parse(e.to_string()))?;
            file.console
        } else {
            toml::from_str(content).map_err(|e| ConsoleError::Parse(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config file. Relative `log_directory` values resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConsoleError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConsoleError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let (Some(dir), Some(base)) = (config.log_directory.as_mut(), path.parent())
            && dir.is_relative()
        {
            *dir = base.join(&*dir);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        if self.line_width < 1 {
            return Err(ConsoleError::InvalidArgument(format!(
                "Invalid 'line_width' argument encountered when initializing Console. Expected a value of 1 or \
                 greater, but encountered {}.",
                self.line_width
            )));
        }
        if let Some(dir) = &self.log_directory
            && dir.exists()
            && !dir.is_dir()
        {
            return Err(ConsoleError::InvalidArgument(format!(
                "Invalid 'log_directory' argument encountered when initializing Console. Expected a directory \
                 path, but encountered {}, which is a file.",
                dir.display()
            )));
        }
        Ok(())
    }

    pub fn wrap_options(&self) -> WrapOptions {
        WrapOptions {
            line_width: self.line_width,
            break_long_words: self.break_long_words,
            break_on_hyphens: self.break_on_hyphens,
            header_offset: 0,
        }
    }
}

/// The three fixed-name log files inside a log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub debug: PathBuf,
    pub message: PathBuf,
    pub error: PathBuf,
}

impl LogPaths {
    pub fn new(directory: &Path, format: LogFormat) -> Self {
        let file = |category: SinkCategory| {
            directory.join(format!("{}{}", category.file_stem(), format.suffix()))
        };
        Self {
            debug: file(SinkCategory::Debug),
            message: file(SinkCategory::Message),
            error: file(SinkCategory::Error),
        }
    }

    pub fn get(&self, category: SinkCategory) -> &Path {
        match category {
            SinkCategory::Debug => &self.debug,
            SinkCategory::Message => &self.message,
            SinkCategory::Error => &self.error,
        }
    }
}

/// Creates the directory `path` names, including missing parents.
///
/// A path with an extension is treated as a file path, and its parent
/// directory is created instead. The file itself is never created.
pub fn ensure_directory_exists(path: &Path) -> Result<(), ConsoleError> {
    let dir = if path.extension().is_some() {
        match path.parent() {
            Some(parent) => parent,
            None => return Ok(()),
        }
    } else {
        path
    };
    create_dir_all(dir)
}

pub(crate) fn create_dir_all(dir: &Path) -> Result<(), ConsoleError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|e| ConsoleError::Io {
        path: dir.display().to_string(),
        source: e,
    })
}
