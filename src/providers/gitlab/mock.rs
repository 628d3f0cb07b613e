use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::{debug, info};
use serde_json::{json, Value};

use super::client::{JsonObject, PipelineQuery};
use super::links::{job_url, pipeline_url, project_url};
use super::project::ProjectRef;
use crate::error::GitLabApiError;
use crate::providers::PipelineSource;

const MOCK_BASE_URL: &str = "https://mock-gitlab.com";
const MOCK_PROJECT_ID: u64 = 3;
const MOCK_PROJECT_PATH: &str = "diaspora/diaspora-project-site";
const LATEST_PIPELINE_ID: u64 = 1000;

const PIPELINE_STATUSES: [&str; 8] = [
    "success", "failed", "running", "success", "pending", "canceled", "success", "manual",
];

const USERS: [(&str, &str); 4] = [
    ("Administrator", "root"),
    ("Ada Lovelace", "ada"),
    ("Grace Hopper", "grace"),
    ("Margaret Hamilton", "margaret"),
];

const STAGES: [(&str, &[&str]); 4] = [
    ("build", &["compile", "assets"]),
    ("test", &["rspec", "lint", "integration"]),
    ("security", &["sast"]),
    ("deploy", &["staging", "production"]),
];

/// Offline stand-in for [`GitLabApi`](super::GitLabApi) serving generated,
/// REST-shaped payloads.
///
/// Output is a pure function of the request and the construction time, so the
/// same call always returns the same data within one run.
#[derive(Debug, Clone)]
pub struct MockGitLabApi {
    now: DateTime<Utc>,
}

impl Default for MockGitLabApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGitLabApi {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Creates a mock whose timestamps are relative to `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        info!("GitLab API client initialized in MOCK MODE - no real API calls will be made");
        Self { now }
    }

    fn pipeline_status(pipeline_id: u64) -> &'static str {
        let index = usize::try_from(pipeline_id % PIPELINE_STATUSES.len() as u64).unwrap_or(0);
        PIPELINE_STATUSES[index]
    }

    fn created_at(&self, pipeline_id: u64) -> DateTime<Utc> {
        let age = LATEST_PIPELINE_ID.saturating_sub(pipeline_id);
        let minutes = i64::try_from(age * 47 + 5).unwrap_or(i64::MAX / 60_000);
        self.now - Duration::minutes(minutes)
    }

    fn pipeline(&self, pipeline_id: u64, ref_: &str) -> Value {
        let status = Self::pipeline_status(pipeline_id);
        let index = usize::try_from(pipeline_id).unwrap_or(0);
        let (name, username) = USERS[index % USERS.len()];
        let created_at = self.created_at(pipeline_id);
        let finished = !matches!(status, "running" | "pending");

        json!({
            "id": pipeline_id,
            "iid": pipeline_id.saturating_sub(900),
            "project_id": MOCK_PROJECT_ID,
            "status": status,
            "source": if pipeline_id % 5 == 0 { "schedule" } else { "push" },
            "ref": ref_,
            "sha": fake_sha(pipeline_id),
            "web_url": pipeline_url(MOCK_BASE_URL, MOCK_PROJECT_PATH, pipeline_id),
            "created_at": timestamp(created_at),
            "updated_at": timestamp(created_at + Duration::minutes(4)),
            "user": {"name": name, "username": username},
            "duration": if finished { json!(180 + (pipeline_id % 7) * 31) } else { Value::Null },
        })
    }

    fn jobs(&self, pipeline_id: u64) -> Vec<Value> {
        let pipeline_status = Self::pipeline_status(pipeline_id);
        let pipeline_ref = json!({"id": pipeline_id, "ref": "main", "status": pipeline_status});
        let created_at = self.created_at(pipeline_id);

        let mut jobs = Vec::new();
        let mut seq = 0u64;

        for (stage_index, (stage, names)) in STAGES.iter().enumerate() {
            for (job_index, name) in names.iter().enumerate() {
                seq += 1;
                let id = pipeline_id * 100 + seq;
                let status = job_status(pipeline_status, stage_index, job_index, name);
                let duration = match status {
                    "success" | "failed" | "canceled" => json!(20.5 + (id % 13) as f64 * 7.25),
                    _ => Value::Null,
                };

                jobs.push(json!({
                    "id": id,
                    "name": name,
                    "stage": stage,
                    "status": status,
                    "allow_failure": *stage == "security",
                    "duration": duration,
                    "created_at": timestamp(created_at),
                    "web_url": job_url(MOCK_BASE_URL, MOCK_PROJECT_PATH, id),
                    "pipeline": pipeline_ref.clone(),
                }));
            }
        }

        // Same order as the REST API: newest job first.
        jobs.reverse();
        jobs
    }

    fn ensure_known(pipeline_id: u64, endpoint: String) -> Result<(), GitLabApiError> {
        if (1..=LATEST_PIPELINE_ID).contains(&pipeline_id) {
            Ok(())
        } else {
            Err(GitLabApiError::NotFound { endpoint })
        }
    }
}

impl PipelineSource for MockGitLabApi {
    async fn get_project(&self, project: &ProjectRef) -> Result<JsonObject, GitLabApiError> {
        debug!("Mock get_project({project})");
        let payload = json!({
            "id": MOCK_PROJECT_ID,
            "name": "Diaspora Project Site",
            "name_with_namespace": "Diaspora / Diaspora Project Site",
            "path": "diaspora-project-site",
            "path_with_namespace": MOCK_PROJECT_PATH,
            "description": "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
            "default_branch": "main",
            "visibility": "private",
            "web_url": project_url(MOCK_BASE_URL, MOCK_PROJECT_PATH),
            "created_at": "2013-09-30T13:46:02Z",
        });
        Ok(into_object(payload))
    }

    async fn get_pipelines(
        &self,
        project: &ProjectRef,
        query: &PipelineQuery,
    ) -> Result<Vec<Value>, GitLabApiError> {
        debug!("Mock get_pipelines({project}, {query:?})");
        let count = u64::from(query.per_page).min(LATEST_PIPELINE_ID);
        Ok((0..count)
            .map(|offset| self.pipeline(LATEST_PIPELINE_ID - offset, &query.ref_))
            .collect())
    }

    async fn get_pipeline_jobs(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Vec<Value>, GitLabApiError> {
        debug!("Mock get_pipeline_jobs({project}, {pipeline_id})");
        Self::ensure_known(
            pipeline_id,
            format!("/projects/{}/pipelines/{pipeline_id}/jobs", project.to_path_segment()),
        )?;
        Ok(self.jobs(pipeline_id))
    }

    async fn get_pipeline_details(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<JsonObject, GitLabApiError> {
        debug!("Mock get_pipeline_details({project}, {pipeline_id})");
        Self::ensure_known(
            pipeline_id,
            format!("/projects/{}/pipelines/{pipeline_id}", project.to_path_segment()),
        )?;
        Ok(into_object(self.pipeline(pipeline_id, "main")))
    }
}

fn job_status(
    pipeline_status: &str,
    stage_index: usize,
    job_index: usize,
    name: &str,
) -> &'static str {
    match (pipeline_status, stage_index) {
        ("success", 3) if name == "production" => "manual",
        ("success", _) => "success",
        ("manual", 3) => "manual",
        ("manual", _) => "success",
        ("pending", 0) => "pending",
        ("pending", _) => "created",
        (_, 0) => "success",
        ("failed", 1) if job_index == 0 => "failed",
        ("failed", 1) => "success",
        ("failed", _) => "skipped",
        ("running", 1) if job_index == 0 => "running",
        ("running", 1) => "pending",
        ("running", _) => "created",
        ("canceled", 1) => "canceled",
        ("canceled", _) => "skipped",
        _ => "created",
    }
}

fn into_object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

fn fake_sha(seed: u64) -> String {
    let mixed = u128::from(seed).wrapping_mul(0x9E37_79B9_7F4A_7C15_F39C_C060_5CED_C835);
    format!("{mixed:032x}{:08x}", seed.wrapping_mul(2_654_435_761) as u32)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
