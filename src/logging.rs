use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{config_dir, env_flag};

pub const LOG_FILE_NAME: &str = "gitlab-tui.log";

/// `~/.config/gitlab-tui/logs/gitlab-tui.log`
pub fn log_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| log_file_in(&dir))
}

fn log_file_in(config_dir: &Path) -> PathBuf {
    config_dir.join("logs").join(LOG_FILE_NAME)
}

/// Level used when `RUST_LOG` is not set.
pub fn default_level(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
///
/// Records go to the log file so they do not tear the terminal UI; stderr is
/// used when `to_stderr` is set or the file cannot be opened.
pub fn init(to_stderr: bool) {
    let mut builder = Builder::new();
    builder
        .filter_level(default_level(env_flag("DEBUG")))
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.level(),
                record.args()
            )
        });

    let mut fallback_reason = None;
    if !to_stderr {
        match open_log_file() {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => fallback_reason = Some(e),
        }
    }

    if builder.try_init().is_err() {
        return;
    }

    if let Some(e) = fallback_reason {
        log::warn!("Could not open log file, logging to stderr: {e}");
    }
}

fn open_log_file() -> std::io::Result<fs::File> {
    let path = log_file_path().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
    })?;
    open_append(&path)
}

fn open_append(path: &Path) -> std::io::Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(false), LevelFilter::Info);
        assert_eq!(default_level(true), LevelFilter::Debug);
    }

    #[test]
    fn test_log_file_under_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_file_in(&dir.path().join("gitlab-tui"));
        assert_eq!(path, dir.path().join("gitlab-tui/logs/gitlab-tui.log"));
    }

    #[test]
    fn test_log_file_created_and_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_file_in(dir.path());

        writeln!(open_append(&path).unwrap(), "first").unwrap();
        writeln!(open_append(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
