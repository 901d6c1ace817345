use autocommit_logging::FailedStep;

/// What a single tick of the watch loop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Status identical to the previous tick (clean or not)
    Unchanged,
    /// Tree went clean without this watcher committing
    Cleaned,
    /// Changes were staged, committed and pushed
    Pushed { files: usize, message: String },
    /// Changes were detected but only logged (dry run)
    DryRun { files: usize, message: String },
    /// The stage/commit/push sequence stopped at `step`
    Failed { step: FailedStep, error: String },
    /// Status could not be read; the stored snapshot was kept
    StatusUnavailable { error: String },
}

impl TickOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::StatusUnavailable { .. })
    }

    /// Exit code for a single-tick run
    pub fn exit_code(&self) -> i32 {
        if self.is_failure() {
            2
        } else {
            0
        }
    }
}
