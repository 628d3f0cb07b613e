/// Web URL of a pipeline page.
///
/// # Arguments
///
/// * `base_url` - GitLab instance base URL (e.g., <https://gitlab.com>)
/// * `project_path` - Project path (e.g., "group/project")
/// * `pipeline_id` - Numeric pipeline ID
///
/// # Returns
///
/// Clickable URL to the pipeline (e.g., <https://gitlab.com/group/project/-/pipelines/123>)
pub fn pipeline_url(base_url: &str, project_path: &str, pipeline_id: u64) -> String {
    format!(
        "{}/{}/-/pipelines/{pipeline_id}",
        base_url.trim_end_matches('/'),
        project_path.trim_matches('/')
    )
}

/// Web URL of a job page.
pub fn job_url(base_url: &str, project_path: &str, job_id: u64) -> String {
    format!(
        "{}/{}/-/jobs/{job_id}",
        base_url.trim_end_matches('/'),
        project_path.trim_matches('/')
    )
}

/// Web URL of a project page.
pub fn project_url(base_url: &str, project_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        project_path.trim_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_url() {
        let url = pipeline_url("https://gitlab.com", "group/project", 123_456);
        assert_eq!(url, "https://gitlab.com/group/project/-/pipelines/123456");
    }

    #[test]
    fn test_job_url() {
        let url = job_url("https://gitlab.com/", "group/project", 789_012);
        assert_eq!(url, "https://gitlab.com/group/project/-/jobs/789012");
    }

    #[test]
    fn test_project_url_trims_slashes() {
        let url = project_url("https://gitlab.example.com/", "/group/sub/project/");
        assert_eq!(url, "https://gitlab.example.com/group/sub/project");
    }
}
