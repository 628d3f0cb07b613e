use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.3;
const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Statuses retried only when the server says when to come back.
const RETRY_AFTER_STATUS_CODES: [u16; 3] = [413, 429, 503];

/// Transport-level retry policy applied by the session before any error reaches the caller.
///
/// The delay before retry `n` (1-based) is `backoff_factor * 2^(n - 1)` seconds,
/// capped at `backoff_max`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub allowed_methods: Vec<Method>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            backoff_max: DEFAULT_BACKOFF_MAX,
            // POST is only safe here because every endpoint this client calls is a read.
            allowed_methods: vec![Method::GET, Method::POST, Method::PUT, Method::DELETE],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    /// Delay before the given retry attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let millis = (self.backoff_factor.max(0.0) * 1000.0 * 2f64.powi(exponent)).round();

        #[allow(clippy::cast_precision_loss)]
        let cap = self.backoff_max.as_millis() as f64;

        if !millis.is_finite() || millis >= cap {
            return self.backoff_max;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let millis = millis as u64;
        Duration::from_millis(millis)
    }

    /// Whether a transport failure is worth another attempt.
    pub fn should_retry_error(&self, err: &reqwest::Error) -> bool {
        err.is_connect() || err.is_timeout() || err.is_request()
    }

    /// Returns the server-requested delay for statuses that honour `Retry-After`.
    ///
    /// Only the delta-seconds form of the header is understood.
    pub fn retry_after(&self, status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
        if !RETRY_AFTER_STATUS_CODES.contains(&status.as_u16()) {
            return None;
        }

        let seconds = headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()?;

        Some(Duration::from_secs(seconds).min(self.backoff_max))
    }
}
