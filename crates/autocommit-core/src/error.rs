use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Git error: {0}")]
    Git(#[from] autocommit_git::GitError),

    #[error("Failed to determine {what}: {reason}")]
    Resolution { what: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
