use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Step of the stage/commit/push sequence that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStep {
    Stage,
    Commit,
    Push,
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedStep::Stage => write!(f, "stage"),
            FailedStep::Commit => write!(f, "commit"),
            FailedStep::Push => write!(f, "push"),
        }
    }
}

/// Structured log events for the watch loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    WatchStarted {
        working_dir: PathBuf,
        branch: String,
        remote: String,
        interval_secs: f64,
        policy: String,
        dry_run: bool,
    },
    RemoteUnreachable {
        remote: String,
    },
    ChangesDetected {
        tick: u64,
        files: usize,
        dry_run: bool,
    },
    DryRunChange {
        tick: u64,
        message: String,
        commands: Vec<String>,
    },
    Committed {
        tick: u64,
        message: String,
    },
    /// A push of an earlier, unpushed commit is being retried
    PushRetrying {
        tick: u64,
        remote: String,
        branch: String,
    },
    Pushed {
        tick: u64,
        remote: String,
        branch: String,
    },
    CommitPushFailed {
        tick: u64,
        step: FailedStep,
        error: String,
        /// Captured stdout/stderr of the failing command, verbatim
        output: String,
    },
    StatusUnavailable {
        tick: u64,
        error: String,
        output: String,
    },
    SnapshotRefreshFailed {
        tick: u64,
        error: String,
    },
    WatchStopped {
        ticks: u64,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for autocommit events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    console: Mutex<Box<dyn Write + Send>>,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    /// Console logger writing to stderr
    pub fn new(format: LogFormat) -> Self {
        Self::with_writer(format, std::io::stderr())
    }

    /// Console logger writing to an arbitrary sink
    pub fn with_writer(format: LogFormat, writer: impl Write + Send + 'static) -> Self {
        Self {
            format,
            console: Mutex::new(Box::new(writer)),
            file_writer: None,
        }
    }

    /// Also append every event as a JSON line to `log_path`
    pub fn with_file(mut self, log_path: &Path) -> std::io::Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        self.file_writer = Some(Mutex::new(file));
        Ok(self)
    }

    pub fn log(&self, event: &LogEvent) {
        // Log to file if configured (always JSON format for file)
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let text = match self.format {
            LogFormat::Json => serde_json::to_string(event).ok(),
            LogFormat::Pretty => Some(Self::render_pretty(event)),
            LogFormat::Compact => Some(Self::render_compact(event)),
        };

        if let Some(text) = text {
            if let Ok(mut console) = self.console.lock() {
                let _ = writeln!(console, "{}", text);
                let _ = console.flush();
            }
        }
    }

    fn render_pretty(event: &LogEvent) -> String {
        match event {
            LogEvent::WatchStarted {
                working_dir,
                branch,
                remote,
                interval_secs,
                policy,
                dry_run,
            } => {
                let mut lines = vec![format!(
                    "{} Watching repository on branch {} (remote: {}). Press Ctrl-C to stop.",
                    "●".bright_blue(),
                    branch.bold(),
                    remote.bold()
                )];
                lines.push(
                    format!(
                        "  dir: {}  interval: {}s  policy: {}",
                        working_dir.display(),
                        interval_secs,
                        policy
                    )
                    .dimmed()
                    .to_string(),
                );
                if *dry_run {
                    lines.push(format!(
                        "  {}",
                        "Dry run: nothing will be staged, committed or pushed".bright_yellow()
                    ));
                }
                lines.join("\n")
            }
            LogEvent::RemoteUnreachable { remote } => format!(
                "{} Warning: remote {} not reachable; will use {} for push anyway",
                "⚠".bright_yellow(),
                remote,
                remote
            ),
            LogEvent::ChangesDetected { files, dry_run, .. } => format!(
                "{} Changes detected. {}({} {})",
                "→".bright_cyan(),
                if *dry_run {
                    ""
                } else {
                    "Staging and committing... "
                },
                files,
                if *files == 1 { "file" } else { "files" }
            ),
            LogEvent::DryRunChange {
                message, commands, ..
            } => {
                let mut lines = vec![format!(
                    "  {} Would commit: {}",
                    "○".bright_yellow(),
                    message
                )];
                for command in commands {
                    lines.push(format!("    {} {}", "$".dimmed(), command.dimmed()));
                }
                lines.join("\n")
            }
            LogEvent::Committed { .. } => {
                format!("  {} Committed. Pushing...", "✓".bright_green())
            }
            LogEvent::PushRetrying { remote, branch, .. } => format!(
                "{} Retrying push of unpushed commit to {} {}",
                "↻".bright_cyan(),
                remote,
                branch
            ),
            LogEvent::Pushed { .. } => format!("  {} Push complete", "✓".bright_green()),
            LogEvent::CommitPushFailed {
                step,
                error,
                output,
                ..
            } => Self::with_output(
                format!(
                    "  {} Auto-commit failed at {}: {}",
                    "✗".bright_red(),
                    step,
                    error.bright_red()
                ),
                output,
            ),
            LogEvent::StatusUnavailable { error, output, .. } => Self::with_output(
                format!(
                    "{} Could not read repository status: {}",
                    "✗".bright_red(),
                    error.bright_red()
                ),
                output,
            ),
            LogEvent::SnapshotRefreshFailed { error, .. } => format!(
                "  {} Could not refresh status after attempt: {}",
                "⚠".bright_yellow(),
                error
            ),
            LogEvent::WatchStopped { .. } => {
                format!("\n{} Stopping autocommit watcher", "■".bright_blue())
            }
        }
    }

    fn render_compact(event: &LogEvent) -> String {
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        match event {
            LogEvent::WatchStarted { branch, remote, .. } => {
                format!("[{}] watch:start {} {}", timestamp, remote, branch)
            }
            LogEvent::RemoteUnreachable { remote } => {
                format!("[{}] remote:unreachable {}", timestamp, remote)
            }
            LogEvent::ChangesDetected { tick, files, .. } => {
                format!("[{}] change:{} {}f", timestamp, tick, files)
            }
            LogEvent::DryRunChange { tick, message, .. } => {
                format!("[{}] dry-run:{} {}", timestamp, tick, message)
            }
            LogEvent::Committed { tick, .. } => format!("[{}] commit:{}", timestamp, tick),
            LogEvent::PushRetrying { tick, .. } => {
                format!("[{}] push:retry:{}", timestamp, tick)
            }
            LogEvent::Pushed { tick, .. } => format!("[{}] push:{}", timestamp, tick),
            LogEvent::CommitPushFailed {
                tick,
                step,
                error,
                output,
            } => Self::with_output(
                format!("[{}] error:{}:{} {}", timestamp, tick, step, error),
                output,
            ),
            LogEvent::StatusUnavailable {
                tick,
                error,
                output,
            } => Self::with_output(
                format!("[{}] error:{}:status {}", timestamp, tick, error),
                output,
            ),
            LogEvent::SnapshotRefreshFailed { tick, error } => {
                format!("[{}] warn:{}:refresh {}", timestamp, tick, error)
            }
            LogEvent::WatchStopped { ticks } => {
                format!("[{}] watch:stop {}", timestamp, ticks)
            }
        }
    }

    /// Append captured command output under a headline, indented
    fn with_output(headline: String, output: &str) -> String {
        if output.is_empty() {
            return headline;
        }
        let mut text = headline;
        for line in output.lines() {
            text.push_str("\n    ");
            text.push_str(line);
        }
        text
    }
}
