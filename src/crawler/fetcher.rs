//! HTTP fetcher for search result pages
//!
//! This module handles all plain HTTP requests of the search stage:
//! - Building the HTTP client with a request timeout
//! - Presenting a randomly chosen identity on every request
//! - Retrying transient failures on a fixed interval

use crate::identity::IdentityPool;
use crate::retry::RetryPolicy;
use crate::FetchError;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds an HTTP client for the search stage
///
/// Identity headers are set per request, not on the client.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches page bodies with randomized identities and retries
pub struct Fetcher {
    client: Client,
    identities: IdentityPool,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher
    ///
    /// # Arguments
    ///
    /// * `identities` - Pool of identities to rotate through
    /// * `retry` - Attempts and pause applied to every fetch
    /// * `timeout` - Per-request timeout
    pub fn new(
        identities: IdentityPool,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = build_http_client(timeout)?;
        Ok(Self {
            client,
            identities,
            retry,
        })
    }

    /// Fetches `url` and returns its body
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body |
    /// | Any other status | Retry after the fixed delay |
    /// | Network error / timeout | Retry after the fixed delay |
    /// | Attempts exhausted | Return the last error |
    ///
    /// A failure is a value, never a panic; callers decide whether to skip.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.retry
            .run(
                |attempt| async move {
                    let result = self.fetch_once(url).await;
                    if let Err(e) = &result {
                        tracing::warn!(attempt = attempt + 1, error = %e, "Fetch attempt failed");
                    }
                    result
                },
                |_: &FetchError| true,
            )
            .await
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let identity = self.identities.pick();
        tracing::debug!(url, user_agent = %identity.user_agent, "Sending request");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &identity.user_agent)
            .header(ACCEPT_LANGUAGE, &identity.accept_language)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
