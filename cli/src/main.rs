//! `notifications-ctl` - command-line entry point.
//!
//! ```text
//! notifications-ctl <on|off> [--config P] [--snapshot P] [--notify-script P]
//! ```
//!
//! Prints exactly one JSON outcome line on stdout and exits with the status's
//! code (0 applied/already-applied, 2 invalid-input, 3 blocked, 4 failed).
//! Logs go to a file, never to stdout/stderr, so the JSON line stays the only
//! output a caller has to parse.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use notifications_config::{PathInputs, PathOverrides, resolve};
use notifications_engine::execute;
use notifications_types::{ACTION_PREFIX, Outcome};

/// Overrides the log file location.
const LOG_PATH_ENV: &str = "NOTIFICATIONS_LOG";
const LOG_DIR: &str = "log";
const LOG_FILENAME: &str = "notifications.log";

#[derive(Debug, Parser)]
#[command(name = "notifications-ctl", disable_help_flag = true)]
struct Cli {
    /// `on` or `off`.
    command: Option<String>,

    /// Anything after the command; must be empty.
    #[arg(hide = true)]
    extra: Vec<String>,

    /// Config file to edit instead of `$CODEX_HOME/config.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapshot file instead of the one next to the config.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Hook script the "on" state points `notify` at.
    #[arg(long = "notify-script")]
    notify_script: Option<PathBuf>,

    #[arg(short, long)]
    help: bool,
}

fn main() -> ExitCode {
    let outcome = run();
    emit(&outcome);
    ExitCode::from(outcome.status().exit_code())
}

fn run() -> Outcome {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            return Outcome::invalid_input(
                format!("{ACTION_PREFIX} <parse>"),
                format!("Argument parsing failed: {}.", err.kind()),
            );
        }
    };

    if cli.help {
        return Outcome::invalid_input(format!("{ACTION_PREFIX} help"), "Help requested.");
    }

    let command = match (cli.command, cli.extra.is_empty()) {
        (Some(command), true) => command,
        _ => {
            return Outcome::invalid_input(
                format!("{ACTION_PREFIX} <missing>"),
                "Command requires exactly one argument: on or off.",
            );
        }
    };

    let inputs = PathInputs::from_env(PathOverrides {
        config: cli.config,
        snapshot: cli.snapshot,
        notify_script: cli.notify_script,
    });
    init_tracing(&inputs);
    tracing::debug!(command = %command, "Running notifications command");

    let outcome = execute(&command, &inputs);
    tracing::info!(
        action = outcome.action(),
        status = %outcome.status(),
        "Command finished"
    );
    outcome
}

fn emit(outcome: &Outcome) {
    let line = match serde_json::to_string(outcome) {
        Ok(line) => line,
        Err(err) => {
            tracing::error!("Failed to encode outcome: {err}");
            return;
        }
    };
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{line}");
    let _ = stdout.flush();
}

fn init_tracing(inputs: &PathInputs) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match open_log_file(inputs) {
        Ok((log_path, file)) => {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .try_init();
            tracing::debug!(path = %log_path.display(), "Logging initialized");
        }
        Err(_) => {
            // No usable log file: stay silent rather than pollute stdout/stderr.
            let _ = tracing_subscriber::registry().with(env_filter).try_init();
        }
    }
}

fn open_log_file(inputs: &PathInputs) -> Result<(PathBuf, File)> {
    let path = log_file_path(inputs).context("no log file location")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log dir {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok((path, file))
}

fn log_file_path(inputs: &PathInputs) -> Option<PathBuf> {
    if let Some(path) = env::var_os(LOG_PATH_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let paths = resolve(inputs).ok()?;
    Some(paths.config_dir().join(LOG_DIR).join(LOG_FILENAME))
}
