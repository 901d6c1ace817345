use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use autocommit_git::{CommandLine, GitError, StatusSnapshot, VersionControl};
use autocommit_logging::{FailedStep, LogEvent, Logger};

use crate::config::{FailurePolicy, WatcherConfig};
use crate::detector::{extract_changed_paths, has_actionable_change};
use crate::error::WatchError;
use crate::message::synthesize_commit_message;
use crate::outcome::TickOutcome;

/// Longest uninterrupted sleep between interrupt checks
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Mutable state carried from one tick to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Status observed at the end of the previous tick
    pub last_snapshot: StatusSnapshot,
    /// A commit exists locally whose push failed (retry-push policy only)
    pub unpushed_commit: bool,
}

/// Polls a repository and commits and pushes whatever changes it finds
pub struct Watcher<V: VersionControl> {
    repo: V,
    config: WatcherConfig,
    branch: String,
    state: RunState,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
    ticks: u64,
}

impl<V: VersionControl> Watcher<V> {
    /// Resolve the push target and take the initial snapshot.
    ///
    /// Fails when no branch is configured and HEAD is not on a branch, or
    /// when the working tree status cannot be read at all. An unreachable
    /// remote is only a warning.
    pub fn start(
        repo: V,
        config: WatcherConfig,
        logger: Arc<Logger>,
    ) -> Result<Self, WatchError> {
        let branch = match config.branch.clone() {
            Some(branch) => branch,
            None => repo
                .current_branch()
                .map_err(|e| WatchError::Resolution {
                    what: "branch".to_string(),
                    reason: e.to_string(),
                })?,
        };

        if !repo.remote_is_reachable(&config.remote) {
            warn!(remote = %config.remote, "Remote not reachable");
            logger.log(&LogEvent::RemoteUnreachable {
                remote: config.remote.clone(),
            });
        }

        let last_snapshot = repo.status_snapshot()?;

        logger.log(&LogEvent::WatchStarted {
            working_dir: config.working_dir.clone(),
            branch: branch.clone(),
            remote: config.remote.clone(),
            interval_secs: config.interval.as_secs_f64(),
            policy: config.policy.to_string(),
            dry_run: config.dry_run,
        });

        Ok(Self {
            repo,
            config,
            branch,
            state: RunState {
                last_snapshot,
                unpushed_commit: false,
            },
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
            ticks: 0,
        })
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn repository(&self) -> &V {
        &self.repo
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Tick until interrupted, sleeping `interval` between ticks.
    ///
    /// An interrupt never cuts a tick short; it is honoured before the next
    /// tick starts or during the sleep. Returns the number of ticks run.
    pub fn run(&mut self) -> u64 {
        while !self.is_interrupted() {
            self.tick();
            if !self.sleep_until_next_tick() {
                break;
            }
        }

        info!(ticks = self.ticks, "Watch loop stopped");
        self.logger.log(&LogEvent::WatchStopped { ticks: self.ticks });
        self.ticks
    }

    /// Returns false when interrupted while sleeping
    fn sleep_until_next_tick(&self) -> bool {
        let deadline = Instant::now() + self.config.interval;
        loop {
            if self.is_interrupted() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            std::thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }

    /// Run one poll-detect-act cycle. Never fails; every error is logged and
    /// reflected in the returned outcome.
    pub fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;
        let tick = self.ticks;

        let current = match self.repo.status_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(tick, error = %e, "Failed to read status, keeping previous snapshot");
                self.logger.log(&LogEvent::StatusUnavailable {
                    tick,
                    error: e.to_string(),
                    output: captured_output(&e),
                });
                return TickOutcome::StatusUnavailable {
                    error: e.to_string(),
                };
            }
        };

        if self.state.unpushed_commit {
            self.retry_push(tick);
        }

        if !has_actionable_change(&self.state.last_snapshot, &current) {
            let outcome = if current == self.state.last_snapshot {
                TickOutcome::Unchanged
            } else {
                debug!(tick, "Working tree went clean without a commit");
                TickOutcome::Cleaned
            };
            self.state.last_snapshot = current;
            return outcome;
        }

        let paths = extract_changed_paths(&current);
        let message = synthesize_commit_message(&paths, Utc::now());
        let files = paths.len();

        self.logger.log(&LogEvent::ChangesDetected {
            tick,
            files,
            dry_run: self.config.dry_run,
        });

        if self.config.dry_run {
            self.logger.log(&LogEvent::DryRunChange {
                tick,
                message: message.clone(),
                commands: self.planned_commands(&message),
            });
            self.state.last_snapshot = current;
            return TickOutcome::DryRun { files, message };
        }

        let outcome = match self.commit_and_push(tick, &message) {
            Ok(()) => {
                self.state.unpushed_commit = false;
                TickOutcome::Pushed { files, message }
            }
            Err((step, e)) => {
                warn!(tick, %step, error = %e, "Auto-commit failed");
                self.logger.log(&LogEvent::CommitPushFailed {
                    tick,
                    step,
                    error: e.to_string(),
                    output: captured_output(&e),
                });
                if step == FailedStep::Push && self.config.policy == FailurePolicy::RetryPush {
                    self.state.unpushed_commit = true;
                }
                TickOutcome::Failed {
                    step,
                    error: e.to_string(),
                }
            }
        };

        // Adopt whatever the tree looks like now so the same change set is
        // not attempted again on the next tick
        self.state.last_snapshot = match self.repo.status_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(tick, error = %e, "Failed to refresh status after attempt");
                self.logger.log(&LogEvent::SnapshotRefreshFailed {
                    tick,
                    error: e.to_string(),
                });
                current
            }
        };

        outcome
    }

    fn commit_and_push(&self, tick: u64, message: &str) -> Result<(), (FailedStep, GitError)> {
        self.repo
            .stage_all()
            .map_err(|e| (FailedStep::Stage, e))?;

        self.repo
            .commit(message)
            .map_err(|e| (FailedStep::Commit, e))?;
        self.logger.log(&LogEvent::Committed {
            tick,
            message: message.to_string(),
        });

        self.repo
            .push(&self.config.remote, &self.branch)
            .map_err(|e| (FailedStep::Push, e))?;
        self.logger.log(&LogEvent::Pushed {
            tick,
            remote: self.config.remote.clone(),
            branch: self.branch.clone(),
        });

        Ok(())
    }

    fn retry_push(&mut self, tick: u64) {
        self.logger.log(&LogEvent::PushRetrying {
            tick,
            remote: self.config.remote.clone(),
            branch: self.branch.clone(),
        });

        match self.repo.push(&self.config.remote, &self.branch) {
            Ok(()) => {
                self.state.unpushed_commit = false;
                self.logger.log(&LogEvent::Pushed {
                    tick,
                    remote: self.config.remote.clone(),
                    branch: self.branch.clone(),
                });
            }
            Err(e) => {
                warn!(tick, error = %e, "Push retry failed");
                self.logger.log(&LogEvent::CommitPushFailed {
                    tick,
                    step: FailedStep::Push,
                    error: e.to_string(),
                    output: captured_output(&e),
                });
            }
        }
    }

    /// The commands a real tick would run, rendered for dry-run output
    fn planned_commands(&self, message: &str) -> Vec<String> {
        [
            CommandLine::git(["add", "-A"]),
            CommandLine::git(["commit", "-m", message]),
            CommandLine::git(["push", self.config.remote.as_str(), self.branch.as_str()]),
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }
}

/// Captured stdout/stderr of a failed git command, empty for other errors
fn captured_output(error: &GitError) -> String {
    error
        .command_failure()
        .map(|failure| failure.combined_output())
        .unwrap_or_default()
}
