//! provider::http
//!
//! Shared request plumbing for the HTTP adapters.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::retry::{race_cancel, RetryPolicy};
use super::traits::ProviderError;

/// Build a client with a per-request timeout.
pub fn build_client(provider: &str, timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("commitweave/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::config(provider, "failed to build HTTP client").with_source(e))
}

/// POST `body` as JSON and decode a JSON reply, with retry and cancellation.
pub async fn post_json<B, T>(
    client: &Client,
    provider: &str,
    url: &str,
    headers: HeaderMap,
    body: &B,
    retry: RetryPolicy,
    cancel: &CancellationToken,
) -> Result<T, ProviderError>
where
    B: Serialize + Sync,
    T: DeserializeOwned,
{
    retry
        .run(provider, cancel, || {
            let request = client.post(url).headers(headers.clone()).json(body);
            race_cancel(provider, cancel, async move {
                let response = request
                    .send()
                    .await
                    .map_err(|e| ProviderError::transport(provider, e))?;

                let status = response.status();
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(ProviderError::status(provider, status.as_u16(), &text));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ProviderError::transport(provider, e))?;
                serde_json::from_slice(&bytes).map_err(|e| {
                    ProviderError::invalid_reply(provider, "response body is not the expected JSON")
                        .with_source(e)
                })
            })
        })
        .await
}
