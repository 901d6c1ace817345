//! Configuration file support for autocommit.
//!
//! Loads `autocommit.toml` from the working directory and
//! `config.toml` from the user's autocommit config directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use autocommit_core::FailurePolicy;

/// Settings that may come from a config file
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Polling interval, e.g. "2s" or "500ms"
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub policy: Option<FailurePolicy>,
}

/// Project config file name
pub const CONFIG_FILE_NAME: &str = "autocommit.toml";

const GLOBAL_CONFIG_DIR: &str = "autocommit";
const GLOBAL_CONFIG_FILE: &str = "config.toml";

impl FileConfig {
    /// Load a config file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Load `autocommit.toml` from the working directory
    pub fn load_project(working_dir: &Path) -> Result<Option<Self>> {
        Self::load(&working_dir.join(CONFIG_FILE_NAME))
    }

    /// Load the per-user config, if a config directory exists
    pub fn load_global() -> Result<Option<Self>> {
        match global_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(None),
        }
    }

    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: FileConfig) -> FileConfig {
        FileConfig {
            interval: self.interval.or(fallback.interval),
            remote: self.remote.or(fallback.remote),
            branch: self.branch.or(fallback.branch),
            policy: self.policy.or(fallback.policy),
        }
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(FileConfig::load_project(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_parses_all_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
interval = "500ms"
remote = "upstream"
branch = "dev"
policy = "retry-push"
"#,
        )
        .unwrap();

        let config = FileConfig::load_project(dir.path()).unwrap().unwrap();
        assert_eq!(config.interval, Some(Duration::from_millis(500)));
        assert_eq!(config.remote.as_deref(), Some("upstream"));
        assert_eq!(config.branch.as_deref(), Some("dev"));
        assert_eq!(config.policy, Some(FailurePolicy::RetryPush));
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "remote = \"backup\"\n").unwrap();

        let config = FileConfig::load_project(dir.path()).unwrap().unwrap();
        assert_eq!(config.remote.as_deref(), Some("backup"));
        assert_eq!(config.interval, None);
        assert_eq!(config.policy, None);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "intervall = \"2s\"\n").unwrap();
        assert!(FileConfig::load_project(dir.path()).is_err());
    }

    #[test]
    fn test_bad_duration_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "interval = \"soon\"\n").unwrap();
        assert!(FileConfig::load_project(dir.path()).is_err());
    }

    #[test]
    fn test_project_overrides_global() {
        let project = FileConfig {
            remote: Some("upstream".to_string()),
            ..Default::default()
        };
        let global = FileConfig {
            interval: Some(Duration::from_secs(5)),
            remote: Some("origin".to_string()),
            ..Default::default()
        };

        let merged = project.or(global);
        assert_eq!(merged.remote.as_deref(), Some("upstream"));
        assert_eq!(merged.interval, Some(Duration::from_secs(5)));
        assert_eq!(merged.branch, None);
    }
}
