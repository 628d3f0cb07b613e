use std::time::Duration;

use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};

use super::retry::RetryPolicy;
use super::LOG_TARGET;
use crate::error::GitLabApiError;

/// A single outbound request, alive only for the duration of one call.
#[derive(Debug)]
pub struct RequestDescriptor<'a> {
    pub method: Method,
    pub url: String,
    pub query: Option<&'a [(&'a str, String)]>,
    pub timeout: Duration,
}

/// Pooled HTTP transport carrying the bearer credential and the retry policy.
///
/// Built once per client and never mutated afterwards. Cloning the inner
/// `reqwest::Client` shares the same connection pool.
#[derive(Debug, Clone)]
pub struct Session {
    http: Client,
    retry: RetryPolicy,
}

impl Session {
    pub fn new(
        token: &str,
        retry: RetryPolicy,
        pool_max_idle_per_host: usize,
    ) -> Result<Self, GitLabApiError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GitLabApiError::InvalidToken(e.to_string()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(concat!("gitlab-tui/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .pool_max_idle_per_host(pool_max_idle_per_host)
            .build()
            .map_err(|e| GitLabApiError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, retry })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Executes the request, retrying transparently according to the policy.
    ///
    /// Returns the final response whatever its status; only transport failures
    /// that survive every retry come back as `Err`.
    pub async fn send(&self, request: &RequestDescriptor<'_>) -> Result<Response, reqwest::Error> {
        let retryable_method = self.retry.allows(&request.method);
        let mut attempt = 0;

        loop {
            let mut builder = self
                .http
                .request(request.method.clone(), request.url.as_str())
                .timeout(request.timeout);
            if let Some(query) = request.query {
                builder = builder.query(query);
            }

            let can_retry = retryable_method && attempt < self.retry.max_retries;

            match builder.send().await {
                Ok(response) => {
                    let wait = if can_retry {
                        self.retry.retry_after(response.status(), response.headers())
                    } else {
                        None
                    };

                    let Some(wait) = wait else {
                        return Ok(response);
                    };

                    attempt += 1;
                    warn!(
                        target: LOG_TARGET,
                        "GitLab API returned {} for {}, retrying in {:.1}s ({attempt}/{})",
                        response.status().as_u16(),
                        request.url,
                        wait.as_secs_f64(),
                        self.retry.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) if can_retry && self.retry.should_retry_error(&e) => {
                    attempt += 1;
                    let wait = self.retry.backoff(attempt);
                    warn!(
                        target: LOG_TARGET,
                        "Network error ({e}), retrying in {:.1}s ({attempt}/{})",
                        wait.as_secs_f64(),
                        self.retry.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
