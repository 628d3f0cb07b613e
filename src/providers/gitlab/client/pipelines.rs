use serde_json::Value;

use super::core::GitLabApi;
use super::response::JsonObject;
use crate::error::GitLabApiError;
use crate::providers::gitlab::project::ProjectRef;

pub const DEFAULT_REF: &str = "master";
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Filter for the pipeline listing: one page, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineQuery {
    pub ref_: String,
    pub per_page: u32,
}

impl Default for PipelineQuery {
    fn default() -> Self {
        Self {
            ref_: DEFAULT_REF.to_string(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PipelineQuery {
    pub fn new(ref_: impl Into<String>, per_page: u32) -> Self {
        Self {
            ref_: ref_.into(),
            per_page,
        }
    }

    fn params(&self) -> [(&'static str, String); 4] {
        [
            ("ref", self.ref_.clone()),
            ("per_page", self.per_page.to_string()),
            ("order_by", "id".to_string()),
            ("sort", "desc".to_string()),
        ]
    }
}

impl GitLabApi {
    /// Fetches project metadata.
    pub async fn get_project(&self, project: &ProjectRef) -> Result<JsonObject, GitLabApiError> {
        let endpoint = format!("/projects/{}", project.to_path_segment());
        self.get_object(&endpoint, None).await
    }

    /// Fetches the most recent pipelines for a ref, newest first.
    pub async fn get_pipelines(
        &self,
        project: &ProjectRef,
        query: &PipelineQuery,
    ) -> Result<Vec<Value>, GitLabApiError> {
        let endpoint = format!("/projects/{}/pipelines", project.to_path_segment());
        self.get_list(&endpoint, Some(&query.params())).await
    }

    /// Fetches the jobs of one pipeline.
    pub async fn get_pipeline_jobs(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Vec<Value>, GitLabApiError> {
        let endpoint = format!(
            "/projects/{}/pipelines/{pipeline_id}/jobs",
            project.to_path_segment()
        );
        self.get_list(&endpoint, None).await
    }

    /// Fetches a single pipeline.
    pub async fn get_pipeline_details(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<JsonObject, GitLabApiError> {
        let endpoint = format!(
            "/projects/{}/pipelines/{pipeline_id}",
            project.to_path_segment()
        );
        self.get_object(&endpoint, None).await
    }
}
