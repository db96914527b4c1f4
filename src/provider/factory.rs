//! provider::factory
//!
//! Provider selection and creation.
//!
//! # Design
//!
//! Commands call [`create_provider`] instead of constructing adapters
//! directly. The API key is read from the environment variable named in
//! the config (or the adapter's default variable); it never comes from a
//! config file.
//!
//! # Example
//!
//! ```ignore
//! use commitweave::core::config::Config;
//! use commitweave::provider::create_provider;
//!
//! let config = Config::load(None)?.config;
//! let provider = create_provider(&config.provider(), config.provider_timeout_secs())?;
//! ```

use std::time::Duration;

use super::anthropic::{self, AnthropicProvider};
use super::openai::{self, OpenAiProvider};
use super::traits::{Provider, ProviderError};
use crate::core::config::ProviderConfig;

/// Supported provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    /// OpenAI and compatible gateways
    #[default]
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
}

impl ProviderKind {
    /// All supported kinds.
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::OpenAi, ProviderKind::Anthropic]
    }

    /// Name used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Parse a kind from its config name.
    ///
    /// ```
    /// use commitweave::provider::ProviderKind;
    ///
    /// assert_eq!(ProviderKind::parse("Anthropic"), Some(ProviderKind::Anthropic));
    /// assert_eq!(ProviderKind::parse("gemini"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "anthropic" => Some(ProviderKind::Anthropic),
            _ => None,
        }
    }

    /// Environment variable consulted when the config names none.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::DEFAULT_API_KEY_ENV,
            ProviderKind::Anthropic => anthropic::DEFAULT_API_KEY_ENV,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::DEFAULT_MODEL,
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Names accepted in `[provider] kind`.
pub fn valid_provider_names() -> Vec<&'static str> {
    ProviderKind::all().iter().map(|k| k.name()).collect()
}

/// Create a provider, reading the API key from the process environment.
pub fn create_provider(
    config: &ProviderConfig,
    timeout_secs: u64,
) -> Result<Box<dyn Provider>, ProviderError> {
    create_provider_with_env(config, timeout_secs, |name| std::env::var(name).ok())
}

/// Create a provider with an explicit environment lookup.
pub fn create_provider_with_env<F>(
    config: &ProviderConfig,
    timeout_secs: u64,
    lookup: F,
) -> Result<Box<dyn Provider>, ProviderError>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = match config.kind.as_deref() {
        Some(name) => ProviderKind::parse(name).ok_or_else(|| {
            ProviderError::config(
                name,
                format!(
                    "unknown provider, must be one of: {}",
                    valid_provider_names().join(", ")
                ),
            )
        })?,
        None => ProviderKind::default(),
    };

    let key_env = config
        .api_key_env
        .as_deref()
        .unwrap_or_else(|| kind.default_api_key_env());
    let api_key = lookup(key_env)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            ProviderError::new(
                kind.name(),
                super::ProviderErrorKind::Auth,
                format!("environment variable {} is not set", key_env),
            )
        })?;

    let model = config
        .model
        .clone()
        .unwrap_or_else(|| kind.default_model().to_string());
    let timeout = Duration::from_secs(timeout_secs);

    Ok(match kind {
        ProviderKind::OpenAi => {
            let mut provider = OpenAiProvider::new(api_key, model, timeout)?;
            if let Some(base) = &config.api_base {
                provider = provider.with_api_base(base.clone());
            }
            Box::new(provider)
        }
        ProviderKind::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key, model, timeout)?;
            if let Some(base) = &config.api_base {
                provider = provider.with_api_base(base.clone());
            }
            Box::new(provider)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderErrorKind;

    fn env_with(key: &'static str, value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name| (name == key).then(|| value.to_string())
    }

    mod provider_kind {
        use super::*;

        #[test]
        fn names_round_trip_through_parse() {
            for kind in ProviderKind::all() {
                assert_eq!(ProviderKind::parse(kind.name()), Some(*kind));
            }
        }

        #[test]
        fn valid_names_listed() {
            assert_eq!(valid_provider_names(), vec!["openai", "anthropic"]);
        }
    }

    #[test]
    fn default_kind_is_openai() {
        let provider = create_provider_with_env(
            &ProviderConfig::default(),
            30,
            env_with("OPENAI_API_KEY", "sk-test"),
        )
        .unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn anthropic_uses_configured_key_env() {
        let config = ProviderConfig {
            kind: Some("anthropic".into()),
            api_key_env: Some("MY_KEY".into()),
            ..Default::default()
        };
        let provider = create_provider_with_env(&config, 30, env_with("MY_KEY", "k")).unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn missing_key_is_auth_error() {
        let result = create_provider_with_env(&ProviderConfig::default(), 30, |_| None);
        let err = result.err().unwrap();
        assert_eq!(err.kind, ProviderErrorKind::Auth);
        assert!(err.message.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn unknown_kind_is_config_error() {
        let config = ProviderConfig {
            kind: Some("gemini".into()),
            ..Default::default()
        };
        let err = create_provider_with_env(&config, 30, |_| Some("k".into()))
            .err()
            .unwrap();
        assert_eq!(err.kind, ProviderErrorKind::Config);
    }
}
