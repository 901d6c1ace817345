use std::path::PathBuf;
use tracing::debug;

use crate::{CommandLine, CommandRunner, GitError, ProcessRunner, StatusSnapshot};

/// The version-control operations the watcher depends on.
pub trait VersionControl {
    /// Porcelain status of the working tree; empty when clean
    fn status_snapshot(&self) -> Result<StatusSnapshot, GitError>;

    /// Name of the checked-out branch. Fails on a detached HEAD.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Advisory check; any failure counts as unreachable
    fn remote_is_reachable(&self, remote: &str) -> bool;

    /// Stage everything, tracked and untracked
    fn stage_all(&self) -> Result<(), GitError>;

    fn commit(&self, message: &str) -> Result<(), GitError>;

    fn push(&self, remote: &str, branch: &str) -> Result<(), GitError>;
}

/// A git working tree driven through the `git` CLI
pub struct GitRepository<R = ProcessRunner> {
    runner: R,
    working_dir: PathBuf,
    env: Vec<(String, String)>,
}

impl GitRepository<ProcessRunner> {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self::with_runner(working_dir, ProcessRunner)
    }
}

impl<R: CommandRunner> GitRepository<R> {
    pub fn with_runner(working_dir: impl Into<PathBuf>, runner: R) -> Self {
        let repo = Self {
            runner,
            working_dir: working_dir.into(),
            env: Vec::new(),
        };
        // Unattended: fail instead of waiting on a credential prompt
        repo.with_env("GIT_TERMINAL_PROMPT", "0")
    }

    /// Set an environment variable for every git command this repository runs
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn git<I, S>(&self, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = self
            .env
            .iter()
            .fold(CommandLine::git(args), |cmd, (k, v)| cmd.with_env(k, v));
        self.runner.execute(&command, Some(&self.working_dir))
    }
}

impl<R: CommandRunner> VersionControl for GitRepository<R> {
    fn status_snapshot(&self) -> Result<StatusSnapshot, GitError> {
        let raw = self.git(["status", "--porcelain"])?;
        Ok(StatusSnapshot::from_porcelain(&raw))
    }

    fn current_branch(&self) -> Result<String, GitError> {
        // `rev-parse --abbrev-ref` prints "HEAD" when detached; symbolic-ref fails instead
        let out = self.git(["symbolic-ref", "--short", "-q", "HEAD"])?;
        let branch = out.trim();
        if branch.is_empty() {
            return Err(GitError::Resolution("current branch".to_string()));
        }
        Ok(branch.to_string())
    }

    fn remote_is_reachable(&self, remote: &str) -> bool {
        match self.git(["ls-remote", "--exit-code", remote]) {
            Ok(_) => true,
            Err(e) => {
                debug!(remote, error = %e, "Remote check failed");
                false
            }
        }
    }

    fn stage_all(&self) -> Result<(), GitError> {
        self.git(["add", "-A"]).map(drop)
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.git(["commit", "-m", message]).map(drop)
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.git(["push", remote, branch]).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandFailure;
    use std::path::Path;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned results and records every command it was asked to run
    #[derive(Default)]
    struct ScriptedRunner {
        responses: RefCell<VecDeque<Result<String, CommandFailure>>>,
        calls: RefCell<Vec<(CommandLine, Option<PathBuf>)>>,
    }

    impl ScriptedRunner {
        fn reply(self, stdout: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(stdout.to_string()));
            self
        }

        fn fail(self, exit_code: i32, stderr: &str) -> Self {
            self.responses.borrow_mut().push_back(Err(CommandFailure {
                command: "git".to_string(),
                exit_code: Some(exit_code),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }));
            self
        }

        fn args(&self, index: usize) -> Vec<String> {
            self.calls.borrow()[index].0.args.clone()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn execute(
            &self,
            command: &CommandLine,
            working_dir: Option<&Path>,
        ) -> Result<String, GitError> {
            self.calls
                .borrow_mut()
                .push((command.clone(), working_dir.map(Path::to_path_buf)));
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected command")
                .map_err(GitError::from)
        }
    }

    fn repo(runner: ScriptedRunner) -> GitRepository<ScriptedRunner> {
        GitRepository::with_runner("/work/tree", runner)
    }

    #[test]
    fn test_status_runs_porcelain_in_working_dir() {
        let repo = repo(ScriptedRunner::default().reply(" M file.txt\n?? new.txt\n"));
        let snap = repo.status_snapshot().unwrap();
        assert_eq!(snap.as_str(), " M file.txt\n?? new.txt");

        let calls = repo.runner.calls.borrow();
        assert_eq!(calls[0].0.program, "git");
        assert_eq!(calls[0].0.args, ["status", "--porcelain"]);
        assert_eq!(calls[0].1.as_deref(), Some(Path::new("/work/tree")));
    }

    #[test]
    fn test_commands_carry_repository_env() {
        let repo = repo(ScriptedRunner::default().reply("main\n"))
            .with_env("GIT_CEILING_DIRECTORIES", "/work");
        repo.current_branch().unwrap();

        let calls = repo.runner.calls.borrow();
        let env = &calls[0].0.env;
        assert!(env.contains(&("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())));
        assert!(env.contains(&("GIT_CEILING_DIRECTORIES".to_string(), "/work".to_string())));
    }

    #[test]
    fn test_status_failure_propagates() {
        let repo = repo(ScriptedRunner::default().fail(128, "fatal: not a git repository"));
        let err = repo.status_snapshot().unwrap_err();
        assert_eq!(err.command_failure().unwrap().exit_code, Some(128));
    }

    #[test]
    fn test_current_branch_trims_output() {
        let repo = repo(ScriptedRunner::default().reply("main\n"));
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert_eq!(repo.runner.args(0), ["symbolic-ref", "--short", "-q", "HEAD"]);
    }

    #[test]
    fn test_detached_head_fails() {
        let repo = repo(ScriptedRunner::default().fail(1, ""));
        assert!(matches!(
            repo.current_branch(),
            Err(GitError::CommandFailed(_))
        ));
    }

    #[test]
    fn test_empty_branch_is_resolution_error() {
        let repo = repo(ScriptedRunner::default().reply("\n"));
        assert!(matches!(
            repo.current_branch(),
            Err(GitError::Resolution(_))
        ));
    }

    #[test]
    fn test_remote_reachability_never_errors() {
        let repo = repo(
            ScriptedRunner::default()
                .reply("abc123\tHEAD\n")
                .fail(128, "fatal: 'nope' does not appear to be a git repository"),
        );
        assert!(repo.remote_is_reachable("origin"));
        assert!(!repo.remote_is_reachable("nope"));
        assert_eq!(repo.runner.args(1), ["ls-remote", "--exit-code", "nope"]);
    }

    #[test]
    fn test_mutations_use_expected_arguments() {
        let repo = repo(ScriptedRunner::default().reply("").reply("").reply(""));
        repo.stage_all().unwrap();
        repo.commit("Auto-commit: x - a.txt, b.txt").unwrap();
        repo.push("origin", "main").unwrap();

        assert_eq!(repo.runner.args(0), ["add", "-A"]);
        assert_eq!(
            repo.runner.args(1),
            ["commit", "-m", "Auto-commit: x - a.txt, b.txt"]
        );
        assert_eq!(repo.runner.args(2), ["push", "origin", "main"]);
    }

    #[test]
    fn test_push_failure_carries_stderr() {
        let repo = repo(ScriptedRunner::default().fail(1, "Could not resolve host"));
        let err = repo.push("origin", "main").unwrap_err();
        assert_eq!(
            err.command_failure().unwrap().stderr,
            "Could not resolve host"
        );
    }
}
