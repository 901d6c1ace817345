//! # autocommit-git
//!
//! Git plumbing for the autocommit watcher.
//!
//! Every git interaction goes through the `git` command line: this crate
//! spawns the process, captures its output and turns a non-zero exit into a
//! typed [`CommandFailure`] that keeps both output streams for diagnosis.
//!
//! ## Key Types
//!
//! - [`CommandRunner`] - Executes a [`CommandLine`] and returns its stdout
//! - [`ProcessRunner`] - The real runner, backed by `std::process::Command`
//! - [`VersionControl`] - The narrow capability surface the watcher needs
//! - [`GitRepository`] - [`VersionControl`] implemented over a runner
//! - [`StatusSnapshot`] - Porcelain status text of the working tree
//!
//! ## Usage
//!
//! ```rust,ignore
//! use autocommit_git::{GitRepository, VersionControl};
//!
//! let repo = GitRepository::new(std::env::current_dir()?);
//! let branch = repo.current_branch()?;
//! let snapshot = repo.status_snapshot()?;
//!
//! if !snapshot.is_clean() {
//!     repo.stage_all()?;
//!     repo.commit("Auto-commit")?;
//!     repo.push("origin", &branch)?;
//! }
//! ```

mod error;
mod executor;
mod repository;
mod status;

pub use error::{CommandFailure, GitError};
pub use executor::{CommandLine, CommandRunner, ProcessRunner};
pub use repository::{GitRepository, VersionControl};
pub use status::StatusSnapshot;
