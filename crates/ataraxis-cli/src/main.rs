mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use ataraxis_console::{Console, ConsoleConfig, ConsoleError, ErrorKind, Level};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ataraxis", version, about = "Drive the ataraxis console from the shell")]
struct Cli {
    #[command(flatten)]
    console: ConsoleArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConsoleArgs {
    /// Read console settings from a TOML file (flags override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum line width for wrapped messages
    #[arg(long, global = true)]
    line_width: Option<usize>,

    /// Directory for debug/message/error log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log file format: .log, .txt or .json
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Logging backend: header or plain
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Split words longer than the line width
    #[arg(long, global = true)]
    break_long_words: bool,

    /// Allow line breaks after hyphens
    #[arg(long, global = true)]
    break_on_hyphens: bool,

    /// Show and persist debug messages
    #[arg(long, global = true)]
    debug: bool,

    /// Write log files from background threads
    #[arg(long, global = true)]
    enqueue: bool,

    /// Draw progress bars
    #[arg(long, global = true)]
    progress: bool,

    /// Keep the console disabled; failures still set the exit code
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print a message at a level
    Echo {
        message: String,

        /// debug, info, success, warning, error or critical
        #[arg(short, long, default_value = "info")]
        level: String,

        /// Write the message as-is, without header or wrapping
        #[arg(long)]
        raw: bool,
    },
    /// Report an error and exit with status 1
    Error {
        message: String,

        /// runtime, value, type, lookup or io
        #[arg(long, default_value = "runtime")]
        kind: String,

        /// Log the error but exit successfully
        #[arg(long)]
        no_raise: bool,
    },
    /// Print a message wrapped to the line width
    Wrap {
        message: String,

        /// Reserve room for the record header
        #[arg(long)]
        header: bool,
    },
    /// Print 0..COUNT while tracking progress
    Track {
        count: usize,

        #[arg(long, default_value = "Processing")]
        description: String,

        #[arg(long)]
        unit: Option<String>,
    },
    /// Advance a progress bar to TOTAL in STEP increments and print the final count
    Progress {
        total: f64,

        #[arg(long, default_value_t = 1.0)]
        step: f64,

        #[arg(long, default_value = "Working")]
        description: String,

        #[arg(long)]
        unit: Option<String>,
    },
}

/// Upper bound on the number of increments `progress` will run.
const MAX_PROGRESS_STEPS: f64 = 1e7;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // User errors were already reported through the console.
            if e.as_user().is_none() {
                eprintln!("{} {e}", style::error_prefix());
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<(), ConsoleError> {
    let console = build_console(&cli.console)?;

    match cli.command {
        Commands::Echo {
            message,
            level,
            raw,
        } => console.echo_named(&message, &level, raw),
        Commands::Error {
            message,
            kind,
            no_raise,
        } => {
            let kind = parse_kind(&kind)?;
            if no_raise {
                console.report(&message);
                Ok(())
            } else {
                console.error(message, kind)
            }
        }
        Commands::Wrap { message, header } => {
            console.echo_raw(&console.format_message(&message, header), Level::Info);
            Ok(())
        }
        Commands::Track {
            count,
            description,
            unit,
        } => {
            for item in console.track(0..count, &description, None, unit.as_deref()) {
                console.echo_raw(&item.to_string(), Level::Info);
            }
            Ok(())
        }
        Commands::Progress {
            total,
            step,
            description,
            unit,
        } => {
            let steps = match progress_steps(total, step) {
                Ok(steps) => steps,
                Err(message) => return console.error(message, ErrorKind::Value),
            };
            let n = console.with_progress(total, &description, unit.as_deref(), |bar| {
                for _ in 0..steps {
                    bar.update(step);
                }
                bar.n()
            });
            console.echo_raw(&n.to_string(), Level::Info);
            Ok(())
        }
    }
}

/// Internal warnings (such as failed log writes) go to stderr. `RUST_LOG`
/// overrides the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Number of `step` increments needed to reach `total`.
fn progress_steps(total: f64, step: f64) -> Result<u64, String> {
    if !total.is_finite() {
        return Err(format!(
            "Invalid 'total' value. Expected a finite number, but encountered {total}."
        ));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(format!(
            "Invalid 'step' value. Expected a positive number, but encountered {step}."
        ));
    }
    let steps = (total / step).ceil().max(0.0);
    if steps > MAX_PROGRESS_STEPS {
        return Err(format!(
            "Invalid 'step' value. Reaching {total} in increments of {step} takes more than \
             {MAX_PROGRESS_STEPS} steps."
        ));
    }
    Ok(steps as u64)
}

fn build_console(args: &ConsoleArgs) -> Result<Console, ConsoleError> {
    let mut config = match &args.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };

    if let Some(width) = args.line_width {
        config.line_width = width;
    }
    if let Some(dir) = &args.log_dir {
        config.log_directory = Some(dir.clone());
    }
    if let Some(format) = &args.log_format {
        config.log_format = format.parse()?;
    }
    if let Some(backend) = &args.backend {
        config.backend = backend.parse()?;
    }
    config.break_long_words |= args.break_long_words;
    config.break_on_hyphens |= args.break_on_hyphens;
    config.debug |= args.debug;
    config.enqueue |= args.enqueue;
    config.show_progress |= args.progress;

    let console = Console::new(config)?;
    if !args.quiet {
        console.enable();
    }
    Ok(console)
}

fn parse_kind(kind: &str) -> Result<ErrorKind, ConsoleError> {
    match kind.to_ascii_lowercase().as_str() {
        "runtime" => Ok(ErrorKind::Runtime),
        "value" => Ok(ErrorKind::Value),
        "type" => Ok(ErrorKind::Type),
        "lookup" => Ok(ErrorKind::Lookup),
        "io" => Ok(ErrorKind::Io),
        _ => Err(ConsoleError::InvalidArgument(format!(
            "Invalid 'kind' argument. Expected runtime, value, type, lookup or io, but encountered '{kind}'."
        ))),
    }
}

fn exit_code(err: &ConsoleError) -> u8 {
    match err {
        ConsoleError::User(_) => 1,
        ConsoleError::InvalidArgument(_) | ConsoleError::InvalidLevel(_) => 2,
        ConsoleError::Io { .. } | ConsoleError::Parse(_) => 3,
    }
}
