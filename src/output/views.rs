use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use comfy_table::{Cell, Table};

use super::status::StatusPalette;
use super::tables::{colored_cell, create_table, header_cell};
use crate::providers::{
    group_jobs_by_stage, status_counts, GitLabJob, GitLabPipeline, GitLabProject,
};

const AUTHOR_WIDTH: usize = 12;
const FALLBACK_TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M";

/// Formats a timestamp in local time, `"Unknown"` when absent.
///
/// An invalid strftime pattern falls back to the default one instead of
/// failing at render time.
pub fn format_timestamp(at: Option<DateTime<Utc>>, format: &str) -> String {
    let Some(at) = at else {
        return "Unknown".to_string();
    };
    let format = if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        FALLBACK_TIMESTAMP_FORMAT
    } else {
        format
    };
    at.with_timezone(&Local).format(format).to_string()
}

/// Shortens long author names to 12 characters followed by `..`.
pub fn truncate_author(author: &str) -> String {
    if author.chars().count() > AUTHOR_WIDTH {
        let head: String = author.chars().take(AUTHOR_WIDTH).collect();
        format!("{head}..")
    } else {
        author.to_string()
    }
}

pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return "-".to_string();
    };
    let total = seconds.round() as u64;
    match (total / 3600, (total % 3600) / 60, total % 60) {
        (0, 0, s) => format!("{s}s"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}

/// `"failed"` -> `"Failed"`, `"waiting_for_resource"` -> `"Waiting for resource"`
pub fn title_case(status: &str) -> String {
    let text = status.replace('_', " ");
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".to_string(),
    }
}

/// Pipeline history, newest first.
pub fn pipeline_table(
    pipelines: &[GitLabPipeline],
    palette: &StatusPalette,
    timestamp_format: &str,
) -> Table {
    let theme = palette.theme();
    let mut table = create_table();
    table.set_header(
        ["Status", "ID", "Ref", "Author", "Created", "Commit"]
            .into_iter()
            .map(|title| header_cell(title, &theme.primary)),
    );

    for pipeline in pipelines {
        let status = pipeline.status.as_str();
        table.add_row(vec![
            colored_cell(palette.label(status, status), palette.color(status)),
            Cell::new(format!("#{}", pipeline.id)),
            colored_cell(&pipeline.ref_, &theme.foreground),
            Cell::new(truncate_author(pipeline.author())),
            Cell::new(format_timestamp(pipeline.created_at, timestamp_format)),
            colored_cell(pipeline.short_sha(), &theme.muted),
        ]);
    }

    table
}

/// One column per stage, one job per cell.
pub fn stage_table(jobs: &[GitLabJob], palette: &StatusPalette) -> Table {
    let theme = palette.theme();
    let stages = group_jobs_by_stage(jobs);
    let mut table = create_table();

    table.set_header(
        stages
            .keys()
            .map(|stage| header_cell(stage, &theme.primary)),
    );

    let depth = stages.values().map(Vec::len).max().unwrap_or(0);
    for row in 0..depth {
        table.add_row(stages.values().map(|stage_jobs| match stage_jobs.get(row) {
            Some(job) => colored_cell(
                palette.label(&job.status, &job.name),
                palette.color(&job.status),
            ),
            None => Cell::new(""),
        }));
    }

    table
}

/// One line per stage: `"test: 2 success, 1 failed"`.
pub fn stage_summary(jobs: &[GitLabJob]) -> Vec<String> {
    status_counts(&group_jobs_by_stage(jobs))
        .into_iter()
        .map(|(stage, counts)| {
            let counts: Vec<String> = counts
                .into_iter()
                .map(|(status, count)| format!("{count} {status}"))
                .collect();
            format!("{stage}: {}", counts.join(", "))
        })
        .collect()
}

/// Key/value summary of a single pipeline.
pub fn pipeline_info_table(
    pipeline: &GitLabPipeline,
    job_count: Option<usize>,
    palette: &StatusPalette,
    timestamp_format: &str,
) -> Table {
    let theme = palette.theme();
    let status = pipeline.status.as_str();
    let mut table = create_table();

    let mut rows: Vec<(&str, Cell)> = vec![
        ("ID", Cell::new(format!("#{}", pipeline.id))),
        (
            "Status",
            colored_cell(
                palette.label(status, &title_case(status)),
                palette.color(status),
            ),
        ),
        ("Ref", Cell::new(&pipeline.ref_)),
        ("Commit", Cell::new(pipeline.short_sha())),
        ("Author", Cell::new(pipeline.author())),
        (
            "Created",
            Cell::new(format_timestamp(pipeline.created_at, timestamp_format)),
        ),
        ("Duration", Cell::new(format_duration(pipeline.duration))),
    ];
    if let Some(count) = job_count {
        rows.push(("Jobs", Cell::new(format!("{count} total jobs"))));
    }
    if let Some(url) = &pipeline.web_url {
        rows.push(("URL", Cell::new(url)));
    }

    for (label, value) in rows {
        table.add_row(vec![header_cell(label, &theme.secondary), value]);
    }
    table
}

pub fn project_table(project: &GitLabProject, palette: &StatusPalette) -> Table {
    let theme = palette.theme();
    let mut table = create_table();
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let rows = [
        ("ID", project.id.to_string()),
        ("Name", project.name.clone()),
        ("Path", optional(&project.path_with_namespace)),
        ("Default branch", optional(&project.default_branch)),
        ("URL", optional(&project.web_url)),
        ("Description", optional(&project.description)),
    ];
    for (label, value) in rows {
        table.add_row(vec![header_cell(label, &theme.secondary), Cell::new(value)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn job(id: u64, name: &str, stage: &str, status: &str) -> GitLabJob {
        GitLabJob {
            id,
            name: name.to_string(),
            stage: stage.to_string(),
            status: status.to_string(),
            ..GitLabJob::default()
        }
    }

    #[test]
    fn test_truncate_author() {
        assert_eq!(truncate_author("Administrator"), "Administrato..");
        assert_eq!(truncate_author("Ada Lovelace"), "Ada Lovelace");
        assert_eq!(truncate_author("Zoë Ångström-Ødegård"), "Zoë Ångström..");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None, "%Y"), "Unknown");

        let at: DateTime<Utc> = "2024-06-15T12:00:00Z".parse().unwrap();
        assert_eq!(format_timestamp(Some(at), "%Y"), "2024");
    }

    #[test]
    fn test_invalid_timestamp_format_falls_back() {
        let at: DateTime<Utc> = "2024-06-15T12:00:00Z".parse().unwrap();
        let rendered = format_timestamp(Some(at), "%Q %");
        assert!(rendered.starts_with("06/1"), "{rendered}");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "-");
        assert_eq!(format_duration(Some(42.4)), "42s");
        assert_eq!(format_duration(Some(201.0)), "3m 21s");
        assert_eq!(format_duration(Some(3_720.0)), "1h 2m");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("failed"), "Failed");
        assert_eq!(title_case("waiting_for_resource"), "Waiting for resource");
        assert_eq!(title_case(""), "Unknown");
    }

    #[test]
    fn test_stage_table_columns_follow_stage_order() {
        let config = Config::default();
        let palette = StatusPalette::new(&config);
        let jobs = vec![
            job(4, "deploy", "deploy", "manual"),
            job(3, "lint", "test", "success"),
            job(2, "rspec", "test", "failed"),
            job(1, "compile", "build", "success"),
        ];

        let rendered = stage_table(&jobs, &palette).to_string();

        let build = rendered.find("build").unwrap();
        let test = rendered.find("test").unwrap();
        let deploy = rendered.find("deploy").unwrap();
        assert!(build < test && test < deploy);
        assert!(rendered.contains(&format!("{} rspec", config.icons.failed)));
    }

    #[test]
    fn test_stage_summary() {
        let jobs = vec![
            job(3, "lint", "test", "success"),
            job(2, "rspec", "test", "failed"),
            job(1, "compile", "build", "success"),
        ];
        assert_eq!(
            stage_summary(&jobs),
            vec!["build: 1 success", "test: 1 failed, 1 success"]
        );
    }

    #[test]
    fn test_pipeline_table_rows() {
        let config = Config::default();
        let palette = StatusPalette::new(&config);
        let pipelines = vec![GitLabPipeline {
            id: 47,
            status: "success".to_string(),
            ref_: "main".to_string(),
            sha: "a91957a858320c0e17f3a0eca7cfacbff50ea29a".to_string(),
            ..GitLabPipeline::default()
        }];

        let rendered = pipeline_table(&pipelines, &palette, "%Y").to_string();
        assert!(rendered.contains("#47"));
        assert!(rendered.contains("a91957a8"));
        assert!(rendered.contains("Unknown"));
    }
}
