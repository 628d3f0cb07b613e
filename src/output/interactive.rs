use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use console::{Key, Term};
use log::{debug, error, info};
use std::fmt::Write as _;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::status::StatusPalette;
use super::styling::{bold, bright_red, dim, magenta_bold, paint};
use super::views::{format_timestamp, pipeline_info_table, stage_table, truncate_author};
use crate::config::Config;
use crate::providers::{
    parse_list, GitLabJob, GitLabPipeline, PipelineQuery, PipelineSource, ProjectRef,
};

const HELP: &[(&str, &str)] = &[
    ("j / ↓", "next pipeline"),
    ("k / ↑", "previous pipeline"),
    ("g / G", "first / last pipeline"),
    ("r", "refresh now"),
    ("?", "toggle this help"),
    ("q / Esc", "quit"),
];

pub struct WatchOptions<'a> {
    pub project: &'a ProjectRef,
    pub query: &'a PipelineQuery,
    pub config: &'a Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Up,
    Down,
    Top,
    Bottom,
    Refresh,
    Help,
    Quit,
    Ignore,
}

fn action_for(key: &Key) -> Action {
    match key {
        Key::ArrowUp | Key::Char('k') => Action::Up,
        Key::ArrowDown | Key::Char('j') => Action::Down,
        Key::Home | Key::Char('g') => Action::Top,
        Key::End | Key::Char('G') => Action::Bottom,
        Key::Char('r') => Action::Refresh,
        Key::Char('?') => Action::Help,
        Key::Escape | Key::Char('q') => Action::Quit,
        _ => Action::Ignore,
    }
}

#[derive(Debug, Default)]
struct WatchState {
    pipelines: Vec<GitLabPipeline>,
    selected: usize,
    jobs: Vec<GitLabJob>,
    jobs_for: Option<u64>,
    message: Option<String>,
    show_help: bool,
    refreshed_at: Option<DateTime<Local>>,
}

impl WatchState {
    fn selected_pipeline(&self) -> Option<&GitLabPipeline> {
        self.pipelines.get(self.selected)
    }

    /// Moves the cursor, returns whether the selection changed.
    fn select(&mut self, action: Action) -> bool {
        let last = self.pipelines.len().saturating_sub(1);
        let next = match action {
            Action::Up => self.selected.saturating_sub(1),
            Action::Down => (self.selected + 1).min(last),
            Action::Top => 0,
            Action::Bottom => last,
            _ => self.selected,
        };
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    /// Swaps in a fresh pipeline list, keeping the cursor on the same pipeline when it is still listed.
    fn replace_pipelines(&mut self, pipelines: Vec<GitLabPipeline>) {
        let keep = self.selected_pipeline().map(|pipeline| pipeline.id);
        self.pipelines = pipelines;
        self.selected = keep
            .and_then(|id| self.pipelines.iter().position(|pipeline| pipeline.id == id))
            .unwrap_or(0);
    }
}

/// Full-screen pipeline monitor.
///
/// Blocks until the user quits. API failures are shown in the status line and
/// never end the loop.
pub async fn watch<S: PipelineSource>(source: &S, options: WatchOptions<'_>) -> Result<()> {
    let term = Term::stdout();
    if !term.is_term() {
        bail!("watch mode needs an interactive terminal, use the `pipelines` command instead");
    }

    let palette = StatusPalette::new(options.config);
    let mut state = WatchState::default();
    let mut ticker = auto_refresh(options.config.ui.auto_refresh);
    let mut keys = spawn_key_reader();

    info!("Watching pipelines for {} on {}", options.project, options.query.ref_);
    let _screen = ScreenGuard::hide_cursor(&term)?;

    refresh(source, &options, &mut state).await;
    render(&term, &state, &options, &palette)?;

    loop {
        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break };
                match action_for(&key) {
                    Action::Quit => break,
                    Action::Ignore => continue,
                    Action::Help => state.show_help = !state.show_help,
                    Action::Refresh => {
                        refresh(source, &options, &mut state).await;
                        if let Some(ticker) = ticker.as_mut() {
                            ticker.reset();
                        }
                    }
                    motion => {
                        if state.select(motion) {
                            load_jobs(source, &options, &mut state).await;
                        }
                    }
                }
            }
            () = next_tick(&mut ticker) => {
                debug!("Auto-refresh");
                refresh(source, &options, &mut state).await;
            }
        }
        render(&term, &state, &options, &palette)?;
    }

    Ok(())
}

/// Hides the cursor for the lifetime of the guard.
///
/// Dropping it clears the screen and shows the cursor again, also when the
/// watch loop returns early with an error.
struct ScreenGuard<'a> {
    term: &'a Term,
}

impl<'a> ScreenGuard<'a> {
    fn hide_cursor(term: &'a Term) -> std::io::Result<Self> {
        term.hide_cursor()?;
        Ok(Self { term })
    }
}

impl Drop for ScreenGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.term.clear_screen() {
            debug!("Failed to clear screen: {e}");
        }
        if let Err(e) = self.term.show_cursor() {
            debug!("Failed to show cursor: {e}");
        }
    }
}

async fn refresh<S: PipelineSource>(source: &S, options: &WatchOptions<'_>, state: &mut WatchState) {
    match source.get_pipelines(options.project, options.query).await {
        Ok(values) => {
            state.replace_pipelines(parse_list(values));
            state.refreshed_at = Some(Local::now());
            state.message = None;
        }
        Err(e) => {
            error!("Failed to load pipelines: {e}");
            state.message = Some(format!("Failed to load pipelines: {e}"));
        }
    }
    load_jobs(source, options, state).await;
}

async fn load_jobs<S: PipelineSource>(
    source: &S,
    options: &WatchOptions<'_>,
    state: &mut WatchState,
) {
    let Some(pipeline_id) = state.selected_pipeline().map(|pipeline| pipeline.id) else {
        state.jobs.clear();
        state.jobs_for = None;
        return;
    };

    match source.get_pipeline_jobs(options.project, pipeline_id).await {
        Ok(values) => {
            state.jobs = parse_list(values);
            state.jobs_for = Some(pipeline_id);
        }
        Err(e) => {
            error!("Failed to load jobs for pipeline {pipeline_id}: {e}");
            state.jobs.clear();
            state.jobs_for = None;
            state.message = Some(format!("Failed to load jobs for #{pipeline_id}: {e}"));
        }
    }
}

fn render(
    term: &Term,
    state: &WatchState,
    options: &WatchOptions<'_>,
    palette: &StatusPalette,
) -> std::io::Result<()> {
    let screen = compose(state, options, palette);
    term.clear_screen()?;
    term.write_str(&screen)
}

fn compose(state: &WatchState, options: &WatchOptions<'_>, palette: &StatusPalette) -> String {
    let theme = palette.theme();
    let format = &options.config.display.timestamp_format;
    let refreshed = state
        .refreshed_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}\n",
        magenta_bold("GitLab TUI"),
        dim(format!(
            "{} · {} · refreshed {refreshed}",
            options.project, options.query.ref_
        ))
    );

    let _ = writeln!(out, "{}", bold("Pipelines"));
    if state.pipelines.is_empty() {
        let _ = writeln!(out, "  {}", dim("No pipelines found"));
    }
    for (index, pipeline) in state.pipelines.iter().enumerate() {
        let status = pipeline.status.as_str();
        let marker = if index == state.selected { "▶" } else { " " };
        let _ = writeln!(
            out,
            "{} {} {} {:<14} {}",
            paint(marker, &theme.primary),
            paint(palette.label(status, &pipeline.ref_), palette.color(status)),
            dim(format!("#{}", pipeline.id)),
            truncate_author(pipeline.author()),
            dim(format_timestamp(pipeline.created_at, format)),
        );
    }

    if let Some(pipeline) = state.selected_pipeline() {
        let loaded = state.jobs_for == Some(pipeline.id);
        let job_count = loaded.then_some(state.jobs.len());
        let _ = writeln!(out, "\n{}", bold("Pipeline Details"));
        let _ = writeln!(out, "{}", pipeline_info_table(pipeline, job_count, palette, format));
        let _ = writeln!(out, "\n{}", bold("Pipeline Stages and Jobs"));
        if loaded && !state.jobs.is_empty() {
            let _ = writeln!(out, "{}", stage_table(&state.jobs, palette));
        } else {
            let _ = writeln!(out, "  {}", dim("No jobs"));
        }
    }

    out.push('\n');
    if let Some(message) = &state.message {
        let _ = writeln!(out, "{}", bright_red(message));
    }
    if state.show_help {
        for (keys, description) in HELP {
            let _ = writeln!(out, "  {:<10} {}", paint(keys, &theme.primary), description);
        }
    } else {
        let _ = writeln!(
            out,
            "{}",
            dim("j/k move  g/G first/last  r refresh  ? help  q quit")
        );
    }
    out
}

fn spawn_key_reader() -> mpsc::UnboundedReceiver<Key> {
    let (tx, rx) = mpsc::unbounded_channel();
    // Not spawn_blocking: runtime shutdown waits for blocking tasks.
    std::thread::spawn(move || {
        let term = Term::stdout();
        while let Ok(key) = term.read_key() {
            if tx.send(key).is_err() {
                break;
            }
        }
    });
    rx
}

fn auto_refresh(seconds: u64) -> Option<Interval> {
    (seconds > 0).then(|| {
        let period = Duration::from_secs(seconds);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    })
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
