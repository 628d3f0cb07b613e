mod core;
mod pipelines;
mod response;
mod retry;
mod session;

pub use self::core::{ClientOptions, GitLabApi, REQUEST_TIMEOUT};
pub use pipelines::{PipelineQuery, DEFAULT_REF};
pub use response::JsonObject;
pub use retry::RetryPolicy;

/// Log target for everything the API client writes.
pub(crate) const LOG_TARGET: &str = "gitlab_tui::api";
