use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use url::Url;

use crate::config::{env_flag, Config};
use crate::credentials::{credentials_path, load_token};
use crate::error::{GitLabApiError, GitLabTuiError};
use crate::git::GitContext;
use crate::output::{
    pipeline_info_table, pipeline_table, print_banner, project_table, stage_summary, stage_table,
    watch, Spinner, StatusPalette, WatchOptions,
};
use crate::providers::{
    parse_list, parse_one, GitLabApi, GitLabJob, GitLabPipeline, GitLabProject, MockGitLabApi,
    PipelineQuery, PipelineSource, ProjectRef, DEFAULT_REF,
};

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
const MAX_PER_PAGE: u32 = 100;

const EXAMPLES: &str = "Examples:
  gitlab-tui --project foo/bar
  gitlab-tui --project 12345 --branch main
  gitlab-tui --url https://gitlab.example.com --project mygroup/myproject
  gitlab-tui pipelines --json --pretty
  gitlab-tui --mock";

#[derive(Parser)]
#[command(name = "gitlab-tui")]
#[command(author, version, about = "Terminal client for GitLab CI/CD pipelines", long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project ID or path (e.g., 'group/project' or '12345')
    #[arg(short = 'P', long, global = true)]
    project: Option<String>,

    /// Branch whose pipelines are shown
    #[arg(short, long, global = true)]
    branch: Option<String>,

    /// GitLab instance URL
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Personal access token
    #[arg(short, long, global = true, env = "GITLAB_TUI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Config file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use generated data instead of a GitLab instance (also MOCK_MODE=true)
    #[arg(long, global = true, default_value_t = false)]
    mock: bool,

    /// Print raw API JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Pipelines fetched per request
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..=100))]
    per_page: Option<u32>,

    /// Log to stderr instead of the log file
    #[arg(long, global = true, default_value_t = false)]
    log_stderr: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Interactive pipeline monitor (default)
    Watch,
    /// Show project metadata
    Project,
    /// List recent pipelines for the branch
    Pipelines,
    /// Show the jobs of a pipeline grouped by stage
    Jobs { pipeline_id: u64 },
    /// Show pipeline details and its jobs
    Pipeline { pipeline_id: u64 },
}

/// Where to look and what to fetch, after merging flags, config and git context.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub domain: String,
    pub project: ProjectRef,
    pub branch: String,
    pub per_page: u32,
}

impl Cli {
    pub fn log_to_stderr(&self) -> bool {
        self.log_stderr
    }

    /// Resolves settings with the precedence flag > config file > git > default.
    pub fn settings(&self, config: &Config, git: &GitContext) -> crate::error::Result<Settings> {
        let remote = git.remote.as_ref();

        let base_url = self
            .url
            .clone()
            .or_else(|| config.gitlab.url.clone())
            .or_else(|| remote.map(|remote| format!("https://{}", remote.domain)))
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());

        let domain = Url::parse(&base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .ok_or_else(|| GitLabTuiError::Config(format!("Invalid GitLab URL: {base_url}")))?;

        let project = self
            .project
            .clone()
            .or_else(|| config.gitlab.project.clone())
            .or_else(|| remote.map(|remote| remote.project_path.clone()))
            .filter(|project| !project.trim().is_empty())
            .ok_or_else(|| {
                GitLabTuiError::Config(
                    "Project not provided and no git remote found. Pass --project <group/project>"
                        .to_string(),
                )
            })?;

        let branch = self
            .branch
            .clone()
            .or_else(|| config.gitlab.branch.clone())
            .or_else(|| git.branch.clone())
            .unwrap_or_else(|| DEFAULT_REF.to_string());

        let per_page = self
            .per_page
            .unwrap_or(config.display.per_page)
            .clamp(1, MAX_PER_PAGE);

        Ok(Settings {
            base_url,
            domain,
            project: ProjectRef::from(project.trim()),
            branch,
            per_page,
        })
    }

    /// Token from `--token`/`GITLAB_TUI_TOKEN`, else the credentials file.
    fn token(&self, domain: &str) -> crate::error::Result<String> {
        if let Some(token) = self.token.as_deref().filter(|token| !token.is_empty()) {
            debug!("Using token from command line or environment");
            return Ok(token.to_string());
        }

        let path = credentials_path().ok_or_else(|| {
            GitLabTuiError::Config("Cannot locate credentials file: home directory unknown".to_string())
        })?;
        load_token(&path, domain)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let git = GitContext::discover();
        let settings = self.settings(&config, &git)?;

        if !self.json {
            print_banner();
        }
        info!(
            "Project {} on branch {} at {}",
            settings.project, settings.branch, settings.base_url
        );

        if self.mock || env_flag("MOCK_MODE") {
            return self.run(&MockGitLabApi::new(), &settings, &config).await;
        }

        let token = self.token(&settings.domain)?;
        let api = GitLabApi::new(&settings.base_url, &token)?;
        debug!(
            "Client for {} uses a {:?} timeout and {} retries",
            api.base_url(),
            api.timeout(),
            api.retry_policy().max_retries
        );
        self.run(&api, &settings, &config).await
    }

    async fn run<S: PipelineSource>(
        &self,
        source: &S,
        settings: &Settings,
        config: &Config,
    ) -> Result<()> {
        let palette = StatusPalette::new(config);
        let timestamp_format = &config.display.timestamp_format;
        let project = &settings.project;
        let query = PipelineQuery::new(settings.branch.clone(), settings.per_page);

        match self.command.unwrap_or(Commands::Watch) {
            Commands::Watch => {
                watch(
                    source,
                    WatchOptions {
                        project,
                        query: &query,
                        config,
                    },
                )
                .await
            }
            Commands::Project => {
                let payload =
                    with_spinner("Fetching project", source.get_project(project)).await?;
                if self.json {
                    return self.print_json(&payload);
                }
                let project: GitLabProject = parse_one(Value::Object(payload)).unwrap_or_default();
                println!("{}", project_table(&project, &palette));
                Ok(())
            }
            Commands::Pipelines => {
                let payload = with_spinner(
                    &format!("Fetching pipelines for {}", query.ref_),
                    source.get_pipelines(project, &query),
                )
                .await?;
                if self.json {
                    return self.print_json(&payload);
                }
                let pipelines: Vec<GitLabPipeline> = parse_list(payload);
                println!("{}", pipeline_table(&pipelines, &palette, timestamp_format));
                Ok(())
            }
            Commands::Jobs { pipeline_id } => {
                let payload = with_spinner(
                    &format!("Fetching jobs for pipeline #{pipeline_id}"),
                    source.get_pipeline_jobs(project, pipeline_id),
                )
                .await?;
                if self.json {
                    return self.print_json(&payload);
                }
                let jobs: Vec<GitLabJob> = parse_list(payload);
                println!("{}", stage_table(&jobs, &palette));
                Ok(())
            }
            Commands::Pipeline { pipeline_id } => {
                let details = with_spinner(
                    &format!("Fetching pipeline #{pipeline_id}"),
                    source.get_pipeline_details(project, pipeline_id),
                )
                .await?;
                let jobs = with_spinner(
                    &format!("Fetching jobs for pipeline #{pipeline_id}"),
                    source.get_pipeline_jobs(project, pipeline_id),
                )
                .await?;
                if self.json {
                    return self.print_json(&serde_json::json!({
                        "pipeline": details,
                        "jobs": jobs,
                    }));
                }

                let pipeline: GitLabPipeline =
                    parse_one(Value::Object(details)).unwrap_or_default();
                let jobs: Vec<GitLabJob> = parse_list(jobs);
                println!(
                    "{}",
                    pipeline_info_table(&pipeline, Some(jobs.len()), &palette, timestamp_format)
                );
                println!("{}", stage_table(&jobs, &palette));
                for line in stage_summary(&jobs) {
                    println!("  {line}");
                }
                Ok(())
            }
        }
    }

    fn print_json(&self, value: &impl Serialize) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{json_output}");
        Ok(())
    }
}

async fn with_spinner<T>(
    message: &str,
    request: impl Future<Output = std::result::Result<T, GitLabApiError>>,
) -> std::result::Result<T, GitLabApiError> {
    let spinner = Spinner::start(message);
    let result = request.await;
    match &result {
        Ok(_) => spinner.finish(),
        Err(e) => spinner.fail(e),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitLabConfig;
    use crate::git::RemoteInfo;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gitlab-tui").chain(args.iter().copied())).unwrap()
    }

    fn repo_context() -> GitContext {
        GitContext {
            remote: Some(RemoteInfo {
                domain: "gitlab.example.com".to_string(),
                project_path: "team/service".to_string(),
            }),
            branch: Some("feature/login".to_string()),
        }
    }

    #[test]
    fn test_git_context_fills_the_gaps() {
        let settings = cli(&[])
            .settings(&Config::default(), &repo_context())
            .unwrap();

        assert_eq!(settings.base_url, "https://gitlab.example.com");
        assert_eq!(settings.domain, "gitlab.example.com");
        assert_eq!(settings.project, ProjectRef::Path("team/service".to_string()));
        assert_eq!(settings.branch, "feature/login");
        assert_eq!(settings.per_page, 10);
    }

    #[test]
    fn test_config_beats_git_context() {
        let config = Config {
            gitlab: GitLabConfig {
                url: Some("https://gitlab.internal:8443/".to_string()),
                branch: Some("develop".to_string()),
                project: Some("42".to_string()),
            },
            ..Config::default()
        };

        let settings = cli(&[]).settings(&config, &repo_context()).unwrap();

        assert_eq!(settings.base_url, "https://gitlab.internal:8443/");
        assert_eq!(settings.domain, "gitlab.internal");
        assert_eq!(settings.project, ProjectRef::Id(42));
        assert_eq!(settings.branch, "develop");
    }

    #[test]
    fn test_flags_beat_everything() {
        let config = Config {
            gitlab: GitLabConfig {
                url: Some("https://config.example.com".to_string()),
                branch: Some("develop".to_string()),
                project: Some("config/project".to_string()),
            },
            ..Config::default()
        };

        let settings = cli(&[
            "-u",
            "https://flag.example.com",
            "-P",
            "flag/project",
            "-b",
            "release",
            "--per-page",
            "50",
        ])
        .settings(&config, &repo_context())
        .unwrap();

        assert_eq!(settings.base_url, "https://flag.example.com");
        assert_eq!(settings.project, ProjectRef::Path("flag/project".to_string()));
        assert_eq!(settings.branch, "release");
        assert_eq!(settings.per_page, 50);
    }

    #[test]
    fn test_defaults_outside_a_repository() {
        let settings = cli(&["--project", "group/project"])
            .settings(&Config::default(), &GitContext::default())
            .unwrap();

        assert_eq!(settings.base_url, DEFAULT_GITLAB_URL);
        assert_eq!(settings.domain, "gitlab.com");
        assert_eq!(settings.branch, "master");
    }

    #[test]
    fn test_missing_project_is_an_error() {
        let err = cli(&[])
            .settings(&Config::default(), &GitContext::default())
            .unwrap_err();
        assert!(err.to_string().contains("--project"));
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let err = cli(&["-P", "a/b", "--url", "not a url"])
            .settings(&Config::default(), &GitContext::default())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid GitLab URL"));
    }

    #[test]
    fn test_per_page_from_config_is_clamped() {
        let mut config = Config::default();
        config.display.per_page = 500;

        let settings = cli(&["-P", "a/b"])
            .settings(&config, &GitContext::default())
            .unwrap();
        assert_eq!(settings.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_per_page_flag_out_of_range_rejected() {
        let result = Cli::try_parse_from(["gitlab-tui", "--per-page", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(cli(&[]).command, None);
        assert_eq!(
            cli(&["jobs", "123"]).command,
            Some(Commands::Jobs { pipeline_id: 123 })
        );
        assert_eq!(
            cli(&["pipeline", "7", "--json"]).command,
            Some(Commands::Pipeline { pipeline_id: 7 })
        );
    }

    #[test]
    fn test_explicit_token_wins() {
        let token = cli(&["--token", "glpat-flag"]).token("gitlab.com").unwrap();
        assert_eq!(token, "glpat-flag");
    }

    #[tokio::test]
    async fn test_one_shot_commands_against_mock() {
        let config = Config::default();
        let settings = cli(&["-P", "group/project"])
            .settings(&config, &GitContext::default())
            .unwrap();
        let source = MockGitLabApi::new();

        for args in [
            vec!["project"],
            vec!["pipelines", "--json"],
            vec!["jobs", "1000"],
            vec!["pipeline", "999", "--json", "--pretty"],
        ] {
            cli(&args).run(&source, &settings, &config).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_api_errors_propagate() {
        let config = Config::default();
        let settings = cli(&["-P", "group/project"])
            .settings(&config, &GitContext::default())
            .unwrap();

        let err = cli(&["jobs", "0"])
            .run(&MockGitLabApi::new(), &settings, &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Resource not found"));
    }
}
