//! HTTP adapter tests against a local wiremock server.

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use commitweave::core::types::CommitRules;
use commitweave::provider::anthropic::{self, AnthropicProvider};
use commitweave::provider::openai::{self, OpenAiProvider};
use commitweave::provider::retry::RetryPolicy;
use commitweave::provider::{AnalysisRequest, Provider, ProviderErrorKind, MAX_ERROR_BODY_CHARS};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(10),
    }
}

fn openai(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new("test-key", openai::DEFAULT_MODEL, Duration::from_secs(10))
        .unwrap()
        .with_api_base(server.uri())
        .with_retry(fast_retry())
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

mod openai_adapter {
    use super::*;

    #[tokio::test]
    async fn sends_bearer_auth_and_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(chat_reply("feat: add logout"))
            .expect(1)
            .mount(&server)
            .await;

        let text = openai(&server)
            .analyze_diff(&CancellationToken::new(), "system", "user")
            .await
            .unwrap();
        assert_eq!(text, "feat: add logout");
    }

    #[tokio::test]
    async fn unavailable_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("fix: retry worked"))
            .expect(1)
            .mount(&server)
            .await;

        let text = openai(&server)
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap();
        assert_eq!(text, "fix: retry worked");
    }

    #[tokio::test]
    async fn retries_stop_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(3)
            .mount(&server)
            .await;

        let err = openai(&server)
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Status(429));
    }

    #[tokio::test]
    async fn bad_request_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad model"))
            .expect(1)
            .mount(&server)
            .await;

        let err = openai(&server)
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Status(400));
        assert!(err.message.contains("bad model"));
    }

    #[tokio::test]
    async fn rejected_key_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let err = openai(&server)
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Auth);
    }

    #[tokio::test]
    async fn long_error_body_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(2000)))
            .mount(&server)
            .await;

        let err = openai(&server)
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap_err();
        let xs = err.message.chars().filter(|&c| c == 'x').count();
        assert_eq!(xs, MAX_ERROR_BODY_CHARS);
    }

    #[tokio::test]
    async fn empty_content_is_an_invalid_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("   "))
            .mount(&server)
            .await;

        let err = openai(&server)
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidReply);
    }

    #[tokio::test]
    async fn analyze_parses_fenced_plan() {
        let server = MockServer::start().await;
        let plan = r#"```json
{"commits":[{"type":"feat","scope":"auth","message":"add logout","files":["src/auth.go"]}]}
```"#;
        Mock::given(method("POST"))
            .respond_with(chat_reply(plan))
            .mount(&server)
            .await;

        let request = AnalysisRequest {
            diff: "diff --git a/src/auth.go b/src/auth.go".to_string(),
            rules: CommitRules::default(),
            ..Default::default()
        };
        let parsed = openai(&server)
            .analyze(&CancellationToken::new(), &request)
            .await
            .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.commits[0].full_message(), "feat(auth): add logout");
    }

    #[tokio::test]
    async fn cancellation_interrupts_slow_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat_reply("late").set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = openai(&server)
            .analyze_diff(&cancel, "s", "u")
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}

mod anthropic_adapter {
    use super::*;

    #[tokio::test]
    async fn sends_version_header_and_joins_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", anthropic::API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "text", "text": "docs: update readme" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            AnthropicProvider::new("test-key", anthropic::DEFAULT_MODEL, Duration::from_secs(10))
                .unwrap()
                .with_api_base(server.uri())
                .with_retry(fast_retry());
        let text = provider
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap();
        assert_eq!(text, "docs: update readme");
    }

    #[tokio::test]
    async fn overloaded_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{ "type": "text", "text": "chore: third time" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new("k", anthropic::DEFAULT_MODEL, Duration::from_secs(10))
            .unwrap()
            .with_api_base(server.uri())
            .with_retry(fast_retry());
        let text = provider
            .analyze_diff(&CancellationToken::new(), "s", "u")
            .await
            .unwrap();
        assert_eq!(text, "chore: third time");
    }
}
