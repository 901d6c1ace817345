use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A git command that ran to completion but did not succeed.
///
/// Both output streams are kept verbatim so the caller can show the operator
/// exactly what git said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandFailure {
    /// Rendered command line, e.g. `git push origin main`
    pub command: String,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandFailure {
    /// Combined output (stdout + stderr) for display
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        if stderr.is_empty() {
            stdout.to_string()
        } else if stdout.is_empty() {
            stderr.to_string()
        } else {
            format!("{}\n{}", stdout, stderr)
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "`{}` exited with status {}", self.command, code),
            None => write!(f, "`{}` was terminated by a signal", self.command),
        }
    }
}

impl std::error::Error for CommandFailure {}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    CommandFailed(#[from] CommandFailure),

    #[error("Could not resolve {0}")]
    Resolution(String),
}

impl GitError {
    /// The captured failure, when git itself reported the error
    pub fn command_failure(&self) -> Option<&CommandFailure> {
        match self {
            GitError::CommandFailed(failure) => Some(failure),
            _ => None,
        }
    }
}
