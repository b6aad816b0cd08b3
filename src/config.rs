//! Configuration file parser for ~/.config/sheaf/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields`
//! off), though we log a warning when the file contains potential typos.
//! Command-line flags override config-file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default User-Agent for page fetches.
///
/// A desktop-browser string: several of the news sites this tool exists to
/// fetch refuse plain library user agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker pool size for parallel page fetches. Values below 1 are
    /// clamped to 1 where the pool is built.
    pub workers: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// User-Agent header sent on every request.
    pub user_agent: String,

    /// Default output path for the digest; overridable with `--out`.
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 8,
            timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output: PathBuf::from("output.txt"),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading; a corrupted or mislocated file
        // should not be slurped into memory wholesale.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {} // Size is within limits, proceed
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["workers", "timeout_secs", "user_agent", "output"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            workers = config.workers,
            timeout_secs = config.timeout_secs,
            "Loaded configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workers, 8);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.output, PathBuf::from("output.txt"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/sheaf_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "workers = 2\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.timeout_secs, 15); // default
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT); // default
    }

    #[test]
    fn test_full_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let content = r#"
workers = 4
timeout_secs = 30
user_agent = "sheaf-test/1.0"
output = "digest.txt"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.user_agent, "sheaf-test/1.0");
        assert_eq!(config.output, PathBuf::from("digest.txt"));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let content = r#"
workers = 3
totally_fake_key = "should not fail"
another_unknown = 42
"#;
        std::fs::write(&path, content).unwrap();

        // Should succeed (unknown keys ignored)
        let config = Config::load(&path).unwrap();
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        // workers should be an integer, not a string
        std::fs::write(&path, "workers = \"many\"\n").unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // Write a file just over 1MB
        let content = "a".repeat(1_048_577);
        std::fs::write(&path, content).unwrap();

        let result = Config::load(&path);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
    }
}
