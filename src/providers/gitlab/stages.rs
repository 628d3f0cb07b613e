use indexmap::IndexMap;

use super::types::GitLabJob;

/// Groups jobs by stage.
///
/// GitLab creates the jobs of earlier stages first, so stages are ordered by
/// their lowest job ID and jobs inside a stage by ID. Jobs without a stage end
/// up under `"unknown"`.
pub fn group_jobs_by_stage(jobs: &[GitLabJob]) -> IndexMap<String, Vec<&GitLabJob>> {
    let mut sorted: Vec<&GitLabJob> = jobs.iter().collect();
    sorted.sort_by_key(|job| job.id);

    let mut stages: IndexMap<String, Vec<&GitLabJob>> = IndexMap::new();
    for job in sorted {
        let stage = if job.stage.is_empty() {
            "unknown"
        } else {
            job.stage.as_str()
        };
        stages.entry(stage.to_string()).or_default().push(job);
    }

    stages
}

/// Counts jobs per status within each stage, in stage order.
pub fn status_counts(
    stages: &IndexMap<String, Vec<&GitLabJob>>,
) -> IndexMap<String, IndexMap<String, usize>> {
    stages
        .iter()
        .map(|(stage, jobs)| {
            let mut counts: IndexMap<String, usize> = IndexMap::new();
            for job in jobs {
                *counts.entry(job.status.clone()).or_default() += 1;
            }
            (stage.clone(), counts)
        })
        .collect()
}
