//! Authenticated HTTP client for the recruiting-platform API
//!
//! Wraps a [`reqwest::Client`] carrying the per-call timeout and the
//! credential headers every endpoint requires, and funnels all outbound
//! calls through the retry layer. A fixed post-success delay throttles the
//! overall request rate.

use crate::config::{Config, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::{FetchError, fetch_with_retry};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Client for the listing, metadata and detail endpoints.
///
/// Cheap to share by reference; the run driver builds exactly one per run.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
    call_delay: Duration,
}

impl ApiClient {
    /// Build a client from the validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a credential cannot be encoded as
    /// an HTTP header value, or when the underlying client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("token", header_value(&config.api_token, "api_token")?);
        headers.insert(
            "publisher",
            header_value(&config.api_publisher, "api_publisher")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .user_agent(concat!("applicant-harvest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
            call_delay: config.call_delay,
        })
    }

    /// Listing endpoint URL for a 1-based page index
    pub fn listing_url(&self, page: u32) -> String {
        format!("{}/candidates/{}", self.base_url, page)
    }

    /// Metadata endpoint URL (page count and total record count)
    pub fn metadata_url(&self) -> String {
        format!("{}/candidates/", self.base_url)
    }

    /// Detail endpoint URL for one candidate identifier
    pub fn detail_url(&self, candidate_id: &str) -> String {
        format!("{}/candidate/{}", self.base_url, candidate_id)
    }

    /// Perform a GET with bounded retries and the post-success throttle delay.
    ///
    /// Returns `None` on exhausted retries or a terminal status — the
    /// uniform "no response" failure signal. Callers never see an error from
    /// this path.
    pub async fn get_with_retry(&self, url: &str) -> Option<reqwest::Response> {
        debug!(url, "GET");

        let response = fetch_with_retry(&self.retry, || {
            let http = &self.http;
            async move {
                let response = http.get(url).send().await.map_err(FetchError::Transport)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status));
                }
                Ok(response)
            }
        })
        .await?;

        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }

        Some(response)
    }
}

fn header_value(raw: &str, key: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|e| {
        Error::config(format!("credential is not a valid header value: {e}"), key)
    })
}
