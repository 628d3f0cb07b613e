mod client;
mod links;
mod mock;
mod project;
mod stages;
mod types;

pub use client::{GitLabApi, JsonObject, PipelineQuery, DEFAULT_REF};
pub use mock::MockGitLabApi;
pub use project::ProjectRef;
pub use stages::{group_jobs_by_stage, status_counts};
pub use types::{parse_list, parse_one, GitLabJob, GitLabPipeline, GitLabProject};
