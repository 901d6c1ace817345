mod config;

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;

use autocommit_core::{
    validate_interval, FailurePolicy, Watcher, WatcherConfig, DEFAULT_INTERVAL, DEFAULT_REMOTE,
};
use autocommit_git::GitRepository;
use autocommit_logging::{init_tracing, LogFormat, Logger};

use crate::config::FileConfig;

#[derive(Parser, Debug)]
#[command(
    name = "autocommit",
    about = "Watch a git working tree and automatically commit and push changes",
    version,
    author
)]
struct Cli {
    /// Polling interval in seconds (default: 2.0)
    #[arg(short, long, value_parser = parse_interval)]
    interval: Option<Duration>,

    /// Git remote to push to (default: origin)
    #[arg(short, long)]
    remote: Option<String>,

    /// Git branch to push to (default: the checked-out branch)
    #[arg(short, long)]
    branch: Option<String>,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// What to do about a commit whose push failed
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,

    /// Show what would be committed without staging, committing or pushing
    #[arg(long)]
    dry_run: bool,

    /// Run a single tick and exit
    #[arg(long)]
    once: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Also append events as JSON lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyChoice {
    Advance,
    RetryPush,
}

impl From<PolicyChoice> for FailurePolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::Advance => FailurePolicy::Advance,
            PolicyChoice::RetryPush => FailurePolicy::RetryPush,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", s))?;
    validate_interval(secs).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    // Determine working directory
    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let project = FileConfig::load_project(&working_dir)?.unwrap_or_default();
    let global = FileConfig::load_global()?.unwrap_or_default();
    let config = resolve_config(&cli, working_dir, project.or(global));
    debug!(?config, "Resolved configuration");

    let mut logger = Logger::new(log_format);
    if let Some(ref path) = cli.log_file {
        logger = logger
            .with_file(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
    }

    let repo = GitRepository::new(&config.working_dir);
    let mut watcher = Watcher::start(repo, config, Arc::new(logger)).context(
        "Failed to start watcher. Ensure you are in a git repo on a branch and git is installed.",
    )?;

    if cli.once {
        let outcome = watcher.tick();
        std::process::exit(outcome.exit_code());
    }

    // Handle Ctrl+C gracefully
    let interrupt_handle = watcher.interrupt_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted. Finishing current tick...");
        interrupt_handle.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    watcher.run();
    Ok(())
}

/// Merge CLI flags over file settings over built-in defaults
fn resolve_config(cli: &Cli, working_dir: PathBuf, file: FileConfig) -> WatcherConfig {
    let mut config = WatcherConfig::new(working_dir)
        .with_interval(cli.interval.or(file.interval).unwrap_or(DEFAULT_INTERVAL))
        .with_remote(
            cli.remote
                .clone()
                .or(file.remote)
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
        )
        .with_policy(
            cli.policy
                .map(FailurePolicy::from)
                .or(file.policy)
                .unwrap_or_default(),
        )
        .with_dry_run(cli.dry_run);

    if let Some(branch) = cli.branch.clone().or(file.branch) {
        config = config.with_branch(branch);
    }
    config
}
