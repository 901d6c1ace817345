use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::WatchError;

/// What the watcher does about a commit whose push failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Adopt the post-attempt status and move on; the commit is only pushed
    /// together with a later change
    #[default]
    Advance,
    /// Like `Advance`, but keep re-pushing on every tick until a push succeeds
    RetryPush,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Advance => write!(f, "advance"),
            FailurePolicy::RetryPush => write!(f, "retry-push"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "advance" => Ok(FailurePolicy::Advance),
            "retry-push" | "retry_push" | "retrypush" => Ok(FailurePolicy::RetryPush),
            _ => Err(format!("Unknown failure policy: {}", s)),
        }
    }
}

/// Configuration for a watch session, fixed once the watcher starts
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Repository working tree
    pub working_dir: PathBuf,
    /// Pause between ticks
    pub interval: Duration,
    /// Remote to push to
    pub remote: String,
    /// Branch to push to (None = checked-out branch)
    pub branch: Option<String>,
    pub policy: FailurePolicy,
    /// Log what would be committed without touching the repository
    pub dry_run: bool,
}

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_REMOTE: &str = "origin";

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interval: DEFAULT_INTERVAL,
            remote: DEFAULT_REMOTE.to_string(),
            branch: None,
            policy: FailurePolicy::default(),
            dry_run: false,
        }
    }
}

impl WatcherConfig {
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            ..Default::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Turn a polling interval in seconds into a `Duration`.
///
/// Rejects negative, NaN and infinite values.
pub fn validate_interval(secs: f64) -> Result<Duration, WatchError> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        WatchError::Config(format!(
            "interval must be a finite number of seconds >= 0, got {}",
            secs
        ))
    })
}
