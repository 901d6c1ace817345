use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, trace};

use crate::{CommandFailure, GitError};

/// A fully formed command: program plus argv, never passed through a shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables for the child
    pub env: Vec<(String, String)>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shorthand for a `git` invocation
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git", args)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Runs external commands on behalf of the repository layer.
///
/// Implementations must not retry; retry policy belongs to callers.
pub trait CommandRunner {
    /// Run `command` to completion and return its stdout.
    ///
    /// `working_dir` defaults to the process's current directory.
    fn execute(&self, command: &CommandLine, working_dir: Option<&Path>)
        -> Result<String, GitError>;
}

/// Runs commands as child processes, blocking until they exit
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn execute(
        &self,
        command: &CommandLine,
        working_dir: Option<&Path>,
    ) -> Result<String, GitError> {
        let start = Instant::now();

        debug!(
            command = %command,
            working_dir = ?working_dir.map(Path::display),
            "Spawning process"
        );

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(command.env.iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null()); // Non-interactive

        // Own process group: a terminal Ctrl-C reaches only the watcher, which
        // lets the running command finish
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| GitError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        debug!(
            exit_code = output.status.code().unwrap_or(-1),
            duration_ms = start.elapsed().as_millis(),
            "Process completed"
        );
        trace!(stdout = %stdout, stderr = %stderr, "Captured output");

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(CommandFailure {
                command: command.to_string(),
                exit_code: output.status.code(),
                stdout,
                stderr,
            }
            .into())
        }
    }
}
