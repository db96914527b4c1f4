//! provider::mock
//!
//! Mock provider implementation for deterministic testing.
//!
//! # Design
//!
//! Replies are scripted up front and handed out in order, one per call.
//! Every call is recorded so tests can inspect the prompts that were sent.
//!
//! # Example
//!
//! ```
//! use commitweave::provider::mock::MockProvider;
//! use commitweave::provider::Provider;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new().with_reply("feat: add widgets");
//! let cancel = CancellationToken::new();
//!
//! let text = provider.analyze_diff(&cancel, "system", "user").await.unwrap();
//! assert_eq!(text, "feat: add widgets");
//! assert_eq!(provider.calls().len(), 1);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::traits::{Provider, ProviderError, ProviderErrorKind};
use crate::core::types::CommitPlan;

const NAME: &str = "mock";

/// Mock provider for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    inner: Arc<Mutex<MockProviderInner>>,
}

#[derive(Debug, Default)]
struct MockProviderInner {
    /// Scripted replies, consumed front to back.
    replies: VecDeque<String>,
    /// Error to return instead of the next reply.
    fail_with: Option<(ProviderErrorKind, String)>,
    /// Recorded calls for verification.
    calls: Vec<MockCall>,
}

/// One recorded `analyze_diff` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub system: String,
    pub user: String,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw text reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push_reply(reply);
        self
    }

    /// Queue a reply containing `plan` as the expected JSON object.
    pub fn with_plan(self, plan: &CommitPlan) -> Self {
        let json = serde_json::to_string_pretty(plan).unwrap_or_default();
        self.with_reply(format!("```json\n{}\n```", json))
    }

    /// Make every subsequent call fail.
    pub fn with_failure(self, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_with = Some((kind, message.into()));
        }
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.replies.push_back(reply.into());
        }
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner
            .lock()
            .map(|inner| inner.calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        NAME
    }

    async fn analyze_diff(
        &self,
        cancel: &CancellationToken,
        system: &str,
        user: &str,
    ) -> Result<String, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::cancelled(NAME));
        }

        let mut inner = self
            .inner
            .lock()
            .map_err(|_| ProviderError::config(NAME, "mock state poisoned"))?;
        inner.calls.push(MockCall {
            system: system.to_string(),
            user: user.to_string(),
        });

        if let Some((kind, message)) = &inner.fail_with {
            return Err(ProviderError::new(NAME, *kind, message.clone()));
        }

        inner
            .replies
            .pop_front()
            .ok_or_else(|| ProviderError::invalid_reply(NAME, "no scripted reply left"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlannedCommit;
    use crate::provider::AnalysisRequest;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let provider = MockProvider::new().with_reply("one").with_reply("two");
        let cancel = CancellationToken::new();

        assert_eq!(provider.analyze_diff(&cancel, "s", "u").await.unwrap(), "one");
        assert_eq!(provider.analyze_diff(&cancel, "s", "u").await.unwrap(), "two");
        assert!(provider.analyze_diff(&cancel, "s", "u").await.is_err());
    }

    #[tokio::test]
    async fn analyze_parses_scripted_plan() {
        let plan = CommitPlan::new(vec![PlannedCommit::new(
            "feat",
            Some("auth"),
            "add logout",
            vec!["src/auth.rs".into()],
        )]);
        let provider = MockProvider::new().with_plan(&plan);
        let cancel = CancellationToken::new();

        let parsed = provider
            .analyze(&cancel, &AnalysisRequest::default())
            .await
            .unwrap();
        assert_eq!(parsed, plan);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.contains("conventional"));
    }

    #[tokio::test]
    async fn configured_failure_is_returned() {
        let provider = MockProvider::new().with_failure(ProviderErrorKind::Status(503), "down");
        let cancel = CancellationToken::new();

        let err = provider.analyze_diff(&cancel, "s", "u").await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Status(503));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let provider = MockProvider::new().with_reply("never");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = provider.analyze_diff(&cancel, "s", "u").await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(provider.calls().is_empty());
    }
}
