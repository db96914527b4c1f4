//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! commitweave has two configuration scopes:
//! - **Global**: User-level settings (provider, planning defaults), TOML
//! - **Repo**: Repository-level commit conventions (scopes, type policy), JSON
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$COMMITWEAVE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/commitweave/config.toml`
//! 3. `~/.commitweave/config.toml`
//!
//! # Repo Config Location
//!
//! `<repo root>/.commitweave.json`
//!
//! # Example
//!
//! ```no_run
//! use commitweave::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! let config = result.config;
//!
//! let rules = config.commit_rules();
//! println!("Allowed types: {}", rules.allowed_types.join("|"));
//! println!("Diff budget: {}", config.max_diff_chars());
//! ```

pub mod schema;

pub use schema::{
    CommitDefaults, CommitTypePolicy, GlobalConfig, ProviderConfig, RepoConfig, ScopeRule,
    TypePolicyMode,
};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::{CommitRules, DEFAULT_MAX_MESSAGE_LENGTH};

/// File name of the repository config, relative to the repo root.
pub const REPO_CONFIG_FILE: &str = ".commitweave.json";

/// Default character budget for the diff included in the prompt.
pub const DEFAULT_MAX_DIFF_CHARS: usize = 12_000;

/// Default number of recent subjects offered as style hints.
pub const DEFAULT_RECENT_SUBJECTS: usize = 10;

/// Default provider request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules automatically. Repo config
/// overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (defaults when no file exists)
    pub repo: RepoConfig,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Build a config from already-parsed parts (used by tests and embedders).
    pub fn from_parts(global: GlobalConfig, repo: RepoConfig) -> Self {
        Self {
            global,
            repo,
            global_path: None,
            repo_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `repo_root` is provided, also loads the repo config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(repo_root: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let (global, global_path) = Self::load_global()?;

        let (repo, repo_path) = match repo_root {
            Some(root) => Self::load_repo(root)?,
            None => (RepoConfig::default(), None),
        };

        global.validate()?;
        repo.validate()?;

        Ok(ConfigLoadResult {
            config: Config {
                global,
                repo,
                global_path,
                repo_path,
            },
        })
    }

    /// Load global configuration from standard locations.
    fn load_global() -> Result<(GlobalConfig, Option<PathBuf>), ConfigError> {
        for path in Self::global_candidates() {
            if path.exists() {
                let config = Self::read_global_config(&path)?;
                return Ok((config, Some(path)));
            }
        }
        Ok((GlobalConfig::default(), None))
    }

    /// Global config locations, in search order.
    pub fn global_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("COMMITWEAVE_CONFIG") {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("commitweave/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".commitweave/config.toml"));
        }
        candidates
    }

    /// Load the repository configuration from `<root>/.commitweave.json`.
    fn load_repo(root: &Path) -> Result<(RepoConfig, Option<PathBuf>), ConfigError> {
        let path = Self::repo_config_path(root);
        if !path.exists() {
            return Ok((RepoConfig::default(), None));
        }
        let config = Self::read_repo_config(&path)?;
        Ok((config, Some(path)))
    }

    fn read_global_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn read_repo_config(path: &Path) -> Result<RepoConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical path for global config.
    ///
    /// Returns `~/.commitweave/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".commitweave/config.toml"))
    }

    /// Get the path of the repo config for a repository root.
    pub fn repo_config_path(root: &Path) -> PathBuf {
        root.join(REPO_CONFIG_FILE)
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    fn commit_defaults(&self) -> Option<&CommitDefaults> {
        self.global.commit.as_ref()
    }

    /// Maximum commit message length; repo overrides global.
    pub fn max_message_length(&self) -> usize {
        self.repo
            .max_message_length
            .or_else(|| self.commit_defaults().and_then(|c| c.max_message_length))
            .unwrap_or(DEFAULT_MAX_MESSAGE_LENGTH)
    }

    /// Character budget for the prompt diff.
    pub fn max_diff_chars(&self) -> usize {
        self.commit_defaults()
            .and_then(|c| c.max_diff_chars)
            .unwrap_or(DEFAULT_MAX_DIFF_CHARS)
    }

    /// Number of recent commit subjects to include as style hints.
    pub fn recent_subjects(&self) -> usize {
        self.commit_defaults()
            .and_then(|c| c.recent_subjects)
            .unwrap_or(DEFAULT_RECENT_SUBJECTS)
    }

    /// Behavioral-test guidance; repo overrides global.
    pub fn behavioral_test(&self) -> String {
        self.repo
            .behavioral_test
            .clone()
            .or_else(|| self.commit_defaults().and_then(|c| c.behavioral_test.clone()))
            .unwrap_or_default()
    }

    /// Assemble the rules a plan must satisfy.
    pub fn commit_rules(&self) -> CommitRules {
        CommitRules {
            allowed_types: self.repo.allowed_types(),
            max_message_length: self.max_message_length(),
            behavioral_test: self.behavioral_test(),
        }
    }

    /// Provider settings (defaults when the section is absent).
    pub fn provider(&self) -> ProviderConfig {
        self.global.provider.clone().unwrap_or_default()
    }

    /// Provider request timeout in seconds.
    pub fn provider_timeout_secs(&self) -> u64 {
        self.global
            .provider
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_without_repo_uses_default_repo_config() {
        let result = Config::load(None).unwrap();
        assert_eq!(result.config.repo, RepoConfig::default());
        assert!(result.config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn load_repo_config() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(REPO_CONFIG_FILE),
            r#"{"default_scope": "core", "max_message_length": 50}"#,
        )
        .unwrap();

        let result = Config::load(Some(temp.path())).unwrap();
        let config = result.config;

        assert_eq!(config.repo.default_scope.as_deref(), Some("core"));
        assert_eq!(config.max_message_length(), 50);
        assert!(config.repo_config_loaded_from().is_some());
    }

    #[test]
    fn missing_repo_config_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(temp.path())).unwrap();
        assert!(result.config.repo_config_loaded_from().is_none());
    }

    #[test]
    fn malformed_repo_config_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(REPO_CONFIG_FILE), "{ not json").unwrap();

        let result = Config::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_policy_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(REPO_CONFIG_FILE),
            r#"{"commit_types": {"mode": "whitelist", "types": []}}"#,
        )
        .unwrap();

        let result = Config::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn precedence_repo_overrides_global() {
        let config = Config::from_parts(
            GlobalConfig {
                commit: Some(CommitDefaults {
                    max_message_length: Some(100),
                    behavioral_test: Some("global".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            RepoConfig {
                max_message_length: Some(60),
                ..Default::default()
            },
        );

        assert_eq!(config.max_message_length(), 60);
        assert_eq!(config.behavioral_test(), "global");
    }

    #[test]
    fn commit_rules_follow_policy() {
        let config = Config::from_parts(
            GlobalConfig::default(),
            RepoConfig {
                commit_types: Some(CommitTypePolicy {
                    mode: TypePolicyMode::Whitelist,
                    types: vec!["feat".to_string(), "fix".to_string()],
                }),
                ..Default::default()
            },
        );

        let rules = config.commit_rules();
        assert_eq!(rules.allowed_types, vec!["feat", "fix"]);
        assert_eq!(rules.max_message_length, DEFAULT_MAX_MESSAGE_LENGTH);
    }

    #[test]
    fn defaults_without_global_sections() {
        let config = Config::default();
        assert_eq!(config.max_diff_chars(), DEFAULT_MAX_DIFF_CHARS);
        assert_eq!(config.recent_subjects(), DEFAULT_RECENT_SUBJECTS);
        assert_eq!(config.provider_timeout_secs(), DEFAULT_TIMEOUT_SECS);
        assert!(config.interactive());
    }
}
