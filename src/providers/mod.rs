mod gitlab;

pub use gitlab::{
    group_jobs_by_stage, parse_list, parse_one, status_counts, GitLabApi, GitLabJob,
    GitLabPipeline, GitLabProject, JsonObject, MockGitLabApi, PipelineQuery, ProjectRef,
    DEFAULT_REF,
};

use serde_json::Value;

use crate::error::GitLabApiError;

/// Anything that can answer the four pipeline queries.
///
/// Implemented by the live [`GitLabApi`] and by [`MockGitLabApi`] for offline
/// use; the views only ever talk to this trait.
#[allow(async_fn_in_trait)]
pub trait PipelineSource {
    async fn get_project(&self, project: &ProjectRef) -> Result<JsonObject, GitLabApiError>;

    async fn get_pipelines(
        &self,
        project: &ProjectRef,
        query: &PipelineQuery,
    ) -> Result<Vec<Value>, GitLabApiError>;

    async fn get_pipeline_jobs(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Vec<Value>, GitLabApiError>;

    async fn get_pipeline_details(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<JsonObject, GitLabApiError>;
}

impl PipelineSource for GitLabApi {
    async fn get_project(&self, project: &ProjectRef) -> Result<JsonObject, GitLabApiError> {
        GitLabApi::get_project(self, project).await
    }

    async fn get_pipelines(
        &self,
        project: &ProjectRef,
        query: &PipelineQuery,
    ) -> Result<Vec<Value>, GitLabApiError> {
        GitLabApi::get_pipelines(self, project, query).await
    }

    async fn get_pipeline_jobs(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Vec<Value>, GitLabApiError> {
        GitLabApi::get_pipeline_jobs(self, project, pipeline_id).await
    }

    async fn get_pipeline_details(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<JsonObject, GitLabApiError> {
        GitLabApi::get_pipeline_details(self, project, pipeline_id).await
    }
}
