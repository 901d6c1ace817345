//! # autocommit-core
//!
//! The watch-detect-commit-push control loop.
//!
//! A [`Watcher`] polls the working tree at a fixed interval. When the status
//! snapshot differs from the last one it saw and is not clean, it stages
//! everything, commits with a synthesized message and pushes. Failures are
//! contained at the tick boundary: they are logged and the loop carries on.

mod config;
mod detector;
mod error;
mod message;
mod outcome;
mod watcher;

pub use config::{
    validate_interval, FailurePolicy, WatcherConfig, DEFAULT_INTERVAL, DEFAULT_REMOTE,
};
pub use detector::{extract_changed_paths, has_actionable_change, STATUS_PREFIX_WIDTH};
pub use error::WatchError;
pub use message::{synthesize_commit_message, MAX_MESSAGE_PATHS};
pub use outcome::TickOutcome;
pub use watcher::{RunState, Watcher};
