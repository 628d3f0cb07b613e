mod interactive;
mod progress;
mod status;
mod styling;
mod tables;
mod views;

pub use interactive::{watch, WatchOptions};
pub use progress::Spinner;
pub use status::StatusPalette;
use styling::{dim, magenta_bold};
pub use views::{pipeline_info_table, pipeline_table, project_table, stage_summary, stage_table};

/// Prints the gitlab-tui banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🦊 gitlab-tui"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Terminal client for GitLab CI/CD pipelines")
    );
}
