use chrono::{DateTime, Utc};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Project metadata shown in the header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabProject {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: Option<String>,
    pub default_branch: Option<String>,
    pub web_url: Option<String>,
    pub description: Option<String>,
}

/// A pipeline as listed in the sidebar.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabPipeline {
    pub id: u64,
    /// Project-scoped sequence number
    pub iid: Option<u64>,
    pub status: String,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub sha: String,
    /// Trigger source (e.g., "push", "schedule", "web")
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Total duration in seconds, only present on the details endpoint
    pub duration: Option<f64>,
    pub coverage: Option<String>,
    pub web_url: Option<String>,
    pub user: Option<GitLabUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabUser {
    pub name: Option<String>,
    pub username: Option<String>,
}

/// A job within a pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitLabJob {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: String,
    /// Execution duration in seconds
    pub duration: Option<f64>,
    pub allow_failure: bool,
    pub web_url: Option<String>,
    pub pipeline: Option<PipelineSummary>,
}

/// The pipeline reference embedded in every job payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineSummary {
    pub id: u64,
    pub status: String,
    #[serde(rename = "ref")]
    pub ref_: String,
}

impl GitLabPipeline {
    /// Display name of whoever triggered the pipeline.
    pub fn author(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|user| user.name.as_deref().or(user.username.as_deref()))
            .unwrap_or("Unknown")
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..8).unwrap_or(&self.sha)
    }
}

/// Deserialises a single payload into a view type.
pub fn parse_one<T: DeserializeOwned>(value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Skipping malformed {}: {e}", short_type_name::<T>());
            None
        }
    }
}

/// Deserialises every element of a list payload, skipping the ones that do not fit.
pub fn parse_list<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values.into_iter().filter_map(parse_one).collect()
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
