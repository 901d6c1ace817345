use serde::{Deserialize, Serialize};
use std::fmt;

/// Porcelain status text of the working tree at one instant.
///
/// One line per changed, untracked or deleted path, in the order git reports
/// them. Two snapshots are equal only when their text is byte-identical. An
/// empty snapshot means a clean tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot(String);

impl StatusSnapshot {
    /// Build a snapshot from raw `git status --porcelain` output.
    ///
    /// Only trailing line breaks are removed; leading whitespace is part of
    /// the first entry's status code.
    pub fn from_porcelain(raw: &str) -> Self {
        Self(raw.trim_end_matches(['\n', '\r']).to_string())
    }

    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Status lines in reported order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }

    pub fn entry_count(&self) -> usize {
        self.lines().count()
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusSnapshot {
    fn from(raw: &str) -> Self {
        Self::from_porcelain(raw)
    }
}

impl From<String> for StatusSnapshot {
    fn from(raw: String) -> Self {
        Self::from_porcelain(&raw)
    }
}
