use std::time::{Duration, Instant};

use log::{debug, error, info};
use reqwest::Method;
use serde_json::Value;

use super::response::{into_list, into_object, JsonObject};
use super::retry::RetryPolicy;
use super::session::{RequestDescriptor, Session};
use super::LOG_TARGET;
use crate::error::GitLabApiError;

/// Fixed per-request deadline.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_PREFIX: &str = "/api/v4";
const POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Client-wide transport settings.
///
/// The defaults are what the application uses; other values exist for tests
/// and are fixed for the lifetime of a client, never per call.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
        }
    }
}

/// GitLab REST (v4) client.
///
/// Every request goes through one pooled [`Session`] that retries transient
/// failures before anything is reported. Failures that survive the retries are
/// classified into a single [`GitLabApiError`].
#[derive(Debug)]
pub struct GitLabApi {
    session: Session,
    base_url: String,
    timeout: Duration,
}

impl GitLabApi {
    /// Creates a client for `base_url` authenticated with `token`.
    ///
    /// No request is made here; an unusable base URL only shows up as a
    /// transport error on the first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be sent as a header value or the
    /// TLS backend cannot be initialised.
    pub fn new(base_url: &str, token: &str) -> Result<Self, GitLabApiError> {
        Self::with_options(base_url, token, ClientOptions::default())
    }

    pub fn with_options(
        base_url: &str,
        token: &str,
        options: ClientOptions,
    ) -> Result<Self, GitLabApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let session = Session::new(token, options.retry, options.pool_max_idle_per_host)?;

        info!(target: LOG_TARGET, "GitLab API client initialized for: {base_url}");

        Ok(Self {
            session,
            base_url,
            timeout: options.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.session.retry_policy()
    }

    pub(super) async fn get_object(
        &self,
        endpoint: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<JsonObject, GitLabApiError> {
        let value = self.request(Method::GET, endpoint, query).await?;
        into_object(endpoint, value)
    }

    pub(super) async fn get_list(
        &self,
        endpoint: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<Vec<Value>, GitLabApiError> {
        let value = self.request(Method::GET, endpoint, query).await?;
        into_list(endpoint, value)
    }

    /// Issues one logical request against `<base_url>/api/v4<endpoint>` and
    /// returns the parsed JSON body.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<Value, GitLabApiError> {
        let url = format!("{}{API_PREFIX}{endpoint}", self.base_url);
        debug!(target: LOG_TARGET, "Making {method} request to: {url}");
        if let Some(query) = query {
            debug!(target: LOG_TARGET, "Request params: {query:?}");
        }

        let descriptor = RequestDescriptor {
            method,
            url,
            query,
            timeout: self.timeout,
        };

        let start = Instant::now();

        let response = match self.session.send(&descriptor).await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(&e, &descriptor.url, start)),
        };

        let status = response.status();
        debug!(
            target: LOG_TARGET,
            "Request completed in {:.3}s - Status: {}",
            start.elapsed().as_secs_f64(),
            status.as_u16()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(target: LOG_TARGET, "Failed to read error response body: {e}");
                "Unable to read error response".to_string()
            });
            error!(
                target: LOG_TARGET,
                "HTTP error after {:.3}s - Status {}: {}",
                start.elapsed().as_secs_f64(),
                status.as_u16(),
                descriptor.url
            );
            return Err(GitLabApiError::from_status(status.as_u16(), endpoint, &body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| self.transport_failure(&e, &descriptor.url, start))
    }

    fn transport_failure(&self, err: &reqwest::Error, url: &str, start: Instant) -> GitLabApiError {
        let elapsed = start.elapsed().as_secs_f64();

        if err.is_timeout() {
            error!(
                target: LOG_TARGET,
                "Request timeout after {elapsed:.3}s (limit {:?}): {url}", self.timeout
            );
            return GitLabApiError::Timeout {
                timeout: self.timeout,
                url: url.to_string(),
            };
        }

        error!(target: LOG_TARGET, "Request exception after {elapsed:.3}s: {err}");
        GitLabApiError::Transport(err.to_string())
    }
}
