use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Number of characters of an error response body kept in [`GitLabApiError::Http`].
pub const ERROR_BODY_LIMIT: usize = 200;

/// JSON payload shape a GitLab endpoint is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Object,
    List,
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::List => f.write_str("list"),
        }
    }
}

/// Failure surfaced by the GitLab API client once the session's retries are exhausted.
///
/// Every variant renders as a display-ready message; callers normally just show
/// `to_string()` to the user.
#[derive(Error, Debug)]
pub enum GitLabApiError {
    #[error("Request timed out after {timeout:?}: {url}")]
    Timeout { timeout: Duration, url: String },

    #[error("Authentication failed. Check your GitLab token.")]
    Unauthorized,

    #[error("Access forbidden. Check your permissions.")]
    Forbidden,

    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response from {endpoint}: expected {expected}, got {found}")]
    UnexpectedShape {
        endpoint: String,
        expected: ResponseShape,
        found: &'static str,
    },

    #[error("Invalid GitLab token: {0}")]
    InvalidToken(String),
}

impl GitLabApiError {
    /// Maps a non-success HTTP status to its error variant.
    ///
    /// Only the first [`ERROR_BODY_LIMIT`] characters of `body` are kept.
    pub fn from_status(status: u16, endpoint: &str, body: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound {
                endpoint: endpoint.to_string(),
            },
            _ => Self::Http {
                status,
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            },
        }
    }

    pub fn unexpected_shape(endpoint: &str, expected: ResponseShape, value: &Value) -> Self {
        Self::UnexpectedShape {
            endpoint: endpoint.to_string(),
            expected,
            found: json_kind(value),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[derive(Error, Debug)]
pub enum GitLabTuiError {
    #[error(transparent)]
    Api(#[from] GitLabApiError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitLabTuiError>;
