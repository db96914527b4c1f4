//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! TOML, located at (in order of precedence):
//! 1. `$COMMITWEAVE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/commitweave/config.toml`
//! 3. `~/.commitweave/config.toml` (canonical write location)
//!
//! # Repo Config
//!
//! JSON, located at `.commitweave.json` in the repository root so it can be
//! committed and shared with the team.
//!
//! # Validation
//!
//! Config values are validated after parsing. A blacklist that removes every
//! default commit type is rejected, as are empty scope names.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::DEFAULT_COMMIT_TYPES;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// interactive = true
///
/// [provider]
/// kind = "openai"
/// model = "gpt-4o-mini"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_secs = 60
///
/// [commit]
/// max_message_length = 72
/// max_diff_chars = 12000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default interactive mode
    pub interactive: Option<bool>,

    /// LLM provider settings
    pub provider: Option<ProviderConfig>,

    /// Commit planning defaults
    pub commit: Option<CommitDefaults>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            provider.validate()?;
        }
        if let Some(commit) = &self.commit {
            commit.validate()?;
        }
        Ok(())
    }
}

/// Provider section of the global config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider kind ("openai" or "anthropic")
    pub kind: Option<String>,

    /// Model identifier passed to the provider
    pub model: Option<String>,

    /// Override for the API base URL
    pub api_base: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl ProviderConfig {
    /// Validate the provider section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(kind) = &self.kind {
            let valid = crate::provider::valid_provider_names();
            if !valid.iter().any(|v| *v == kind.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid provider '{}', must be one of: {}",
                    kind,
                    valid.join(", ")
                )));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "provider.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(env) = &self.api_key_env {
            if env.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "provider.api_key_env cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Commit planning defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CommitDefaults {
    /// Maximum commit message length
    pub max_message_length: Option<usize>,

    /// Character budget for the diff sent to the provider
    pub max_diff_chars: Option<usize>,

    /// Number of recent subjects offered as style hints
    pub recent_subjects: Option<usize>,

    /// Guidance on classifying behavioral tests
    pub behavioral_test: Option<String>,
}

impl CommitDefaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_length == Some(0) {
            return Err(ConfigError::InvalidValue(
                "commit.max_message_length must be greater than zero".to_string(),
            ));
        }
        if self.max_diff_chars == Some(0) {
            return Err(ConfigError::InvalidValue(
                "commit.max_diff_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```json
/// {
///   "scopes": [
///     { "path": "src/auth", "scope": "auth" },
///     { "path": "docs", "scope": "docs" }
///   ],
///   "default_scope": "core",
///   "commit_types": { "mode": "blacklist", "types": ["style"] }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Path-prefix to scope rules, in priority order for equal prefixes
    pub scopes: Vec<ScopeRule>,

    /// Scope used when no rule matches
    pub default_scope: Option<String>,

    /// Commit type policy
    pub commit_types: Option<CommitTypePolicy>,

    /// Overrides the global maximum message length
    pub max_message_length: Option<usize>,

    /// Overrides the global behavioral-test guidance
    pub behavioral_test: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.scopes {
            if rule.scope.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "scope for path '{}' cannot be empty",
                    rule.path
                )));
            }
        }

        if let Some(scope) = &self.default_scope {
            if scope.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "default_scope cannot be empty".to_string(),
                ));
            }
        }

        if let Some(policy) = &self.commit_types {
            policy.validate()?;
        }

        if self.max_message_length == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_message_length must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether any scope information is configured.
    pub fn has_scopes(&self) -> bool {
        !self.scopes.is_empty() || self.default_scope.is_some()
    }

    /// Commit types allowed by this repository's policy.
    pub fn allowed_types(&self) -> Vec<String> {
        match &self.commit_types {
            Some(policy) => policy.allowed_types(),
            None => default_types(),
        }
    }

    /// Whether `commit_type` passes the repository's type policy.
    pub fn is_type_allowed(&self, commit_type: &str) -> bool {
        match &self.commit_types {
            Some(policy) => policy.allows(commit_type),
            None => DEFAULT_COMMIT_TYPES.contains(&commit_type),
        }
    }
}

/// Maps a path prefix to a scope name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScopeRule {
    /// Repo-relative path prefix
    pub path: String,
    /// Scope name used in `type(scope): message`
    pub scope: String,
}

/// Whether the type list is an allow-list or a deny-list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TypePolicyMode {
    Whitelist,
    Blacklist,
}

/// Repository commit type policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommitTypePolicy {
    pub mode: TypePolicyMode,
    #[serde(default)]
    pub types: Vec<String>,
}

impl CommitTypePolicy {
    /// Types a plan may use under this policy.
    pub fn allowed_types(&self) -> Vec<String> {
        match self.mode {
            TypePolicyMode::Whitelist => self.types.clone(),
            TypePolicyMode::Blacklist => default_types()
                .into_iter()
                .filter(|t| !self.types.contains(t))
                .collect(),
        }
    }

    pub fn allows(&self, commit_type: &str) -> bool {
        let listed = self.types.iter().any(|t| t == commit_type);
        match self.mode {
            TypePolicyMode::Whitelist => listed,
            TypePolicyMode::Blacklist => !listed && DEFAULT_COMMIT_TYPES.contains(&commit_type),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_types().is_empty() {
            return Err(ConfigError::InvalidValue(match self.mode {
                TypePolicyMode::Whitelist => "commit_types whitelist cannot be empty".to_string(),
                TypePolicyMode::Blacklist => {
                    "commit_types blacklist removes every commit type".to_string()
                }
            }));
        }
        Ok(())
    }
}

fn default_types() -> Vec<String> {
    DEFAULT_COMMIT_TYPES.iter().map(|t| t.to_string()).collect()
}
