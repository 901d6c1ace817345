use chrono::{DateTime, SecondsFormat, Utc};

/// Paths listed in a commit message before the rest are dropped
pub const MAX_MESSAGE_PATHS: usize = 10;

/// Build `Auto-commit: <UTC timestamp> - <paths>` from the first
/// [`MAX_MESSAGE_PATHS`] changed paths.
pub fn synthesize_commit_message(paths: &[String], timestamp: DateTime<Utc>) -> String {
    let listed = paths
        .iter()
        .take(MAX_MESSAGE_PATHS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Auto-commit: {} - {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        listed
    )
}
