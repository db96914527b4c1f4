//! provider::traits
//!
//! Provider trait definition for talking to a language model.
//!
//! # Design
//!
//! The `Provider` trait is async because every call is a network round trip.
//! Adapters implement only [`Provider::analyze_diff`] (free-form system/user
//! text in, text out); [`Provider::analyze`] has a default implementation
//! that builds the planning prompt, calls `analyze_diff`, and parses the
//! JSON reply into a [`CommitPlan`].
//!
//! Every method takes the caller's [`CancellationToken`]. A cancelled token
//! makes the in-flight call return [`ProviderErrorKind::Cancelled`].
//!
//! # Example
//!
//! ```ignore
//! use commitweave::provider::{AnalysisRequest, Provider};
//!
//! async fn propose(provider: &dyn Provider, request: &AnalysisRequest) {
//!     let cancel = CancellationToken::new();
//!     let plan = provider.analyze(&cancel, request).await?;
//!     println!("{} commit(s) proposed", plan.len());
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::types::{CommitPlan, CommitRules, FileChange};
use crate::planner::{prompt, reply};

/// Response bodies are cut to this many characters before they reach an
/// error message.
pub const MAX_ERROR_BODY_CHARS: usize = 500;

/// Category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The cancellation token fired.
    Cancelled,
    /// The API answered with a non-success HTTP status.
    Status(u16),
    /// Connection, TLS, or timeout failure.
    Transport,
    /// Missing or rejected credentials.
    Auth,
    /// The reply could not be turned into the expected shape.
    InvalidReply,
    /// The provider is misconfigured.
    Config,
}

/// Errors from provider operations.
#[derive(Debug, Error)]
#[error("{provider}: {message}")]
pub struct ProviderError {
    /// Provider name (e.g. "openai")
    pub provider: String,
    pub kind: ProviderErrorKind,
    /// Short, credential-free description
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(provider: &str, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn cancelled(provider: &str) -> Self {
        Self::new(provider, ProviderErrorKind::Cancelled, "request cancelled")
    }

    /// Non-success HTTP status. The body is truncated before inclusion.
    pub fn status(provider: &str, status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ProviderErrorKind::Auth,
            _ => ProviderErrorKind::Status(status),
        };
        let body = truncate_body(body.trim());
        let message = if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body)
        };
        Self::new(provider, kind, message)
    }

    pub fn transport(provider: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            "network error".to_string()
        };
        Self::new(provider, ProviderErrorKind::Transport, message).with_source(err)
    }

    pub fn invalid_reply(provider: &str, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::InvalidReply, message)
    }

    pub fn config(provider: &str, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Config, message)
    }

    /// Whether another attempt may succeed.
    ///
    /// Only 429/502/503/504 and transport failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::Status(429 | 502 | 503 | 504) | ProviderErrorKind::Transport
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ProviderErrorKind::Cancelled
    }
}

/// Cut `body` to [`MAX_ERROR_BODY_CHARS`] characters, marking the cut.
pub fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut out: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    out.push_str("...");
    out
}

/// Everything the model needs to propose a plan.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Changed files with status, summary, and scope
    pub files: Vec<FileChange>,
    /// Bounded diff text
    pub diff: String,
    /// Recent subjects, newest first, as style hints
    pub recent_subjects: Vec<String>,
    pub rules: CommitRules,
    /// Whether the repository defines scope rules
    pub has_scopes: bool,
    /// Ask for exactly one commit
    pub single_commit: bool,
}

/// The Provider trait for talking to a language model.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a provider can be shared
/// across tasks.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name used in errors and logs.
    fn name(&self) -> &str;

    /// Send free-form system and user text; return the model's text reply.
    async fn analyze_diff(
        &self,
        cancel: &CancellationToken,
        system: &str,
        user: &str,
    ) -> Result<String, ProviderError>;

    /// Propose a commit plan for `request`.
    ///
    /// The reply must be the `{"commits": [...]}` object, optionally wrapped
    /// in a single code fence.
    async fn analyze(
        &self,
        cancel: &CancellationToken,
        request: &AnalysisRequest,
    ) -> Result<CommitPlan, ProviderError> {
        let system = prompt::system_prompt(&request.rules);
        let user = prompt::user_prompt(request);
        let text = self.analyze_diff(cancel, &system, &user).await?;
        reply::parse_plan(&text)
            .map_err(|e| ProviderError::invalid_reply(self.name(), e.to_string()))
    }
}
