use log::{debug, error};
use std::path::{Path, PathBuf};

use crate::config::config_dir;
use crate::error::{GitLabTuiError, Result};

pub const CREDENTIALS_FILE_NAME: &str = "credentials";

/// `~/.config/gitlab-tui/credentials`
pub fn credentials_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CREDENTIALS_FILE_NAME))
}

/// Reads the personal access token for `domain` from a credentials file.
///
/// The file is TOML with one table per GitLab host:
///
/// ```toml
/// ["gitlab.com"]
/// token = "glpat-..."
/// ```
///
/// A single top-level `token` key, or an old-style `token=<value>` line, is
/// accepted when no table matches the domain.
pub fn load_token(path: &Path, domain: &str) -> Result<String> {
    if !path.exists() {
        error!("Credentials file not found: {}", path.display());
        return Err(GitLabTuiError::Config(format!(
            "Credentials file not found at {}\n\n{}",
            path.display(),
            format_hint(domain)
        )));
    }

    let contents = std::fs::read_to_string(path)?;

    let table = match contents.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => {
            if let Some(token) = legacy_token(&contents) {
                debug!("Using legacy token line from {}", path.display());
                return Ok(token);
            }
            error!("Failed to parse credentials file {}: {e}", path.display());
            return Err(GitLabTuiError::Config(format!(
                "Failed to parse credentials file: {}\n\n{}",
                path.display(),
                format_hint(domain)
            )));
        }
    };

    if let Some(section) = table.get(domain) {
        return section
            .get("token")
            .and_then(|token| token.as_str())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                GitLabTuiError::Config(format!(
                    "No token found for '{domain}'\n\n{}",
                    format_hint(domain)
                ))
            });
    }

    if let Some(token) = table
        .get("token")
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
    {
        debug!("Using top-level token from {}", path.display());
        return Ok(token.to_string());
    }

    Err(GitLabTuiError::Config(format!(
        "No configuration found for '{domain}'\n\n{}",
        format_hint(domain)
    )))
}

fn legacy_token(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("token="))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn format_hint(domain: &str) -> String {
    format!(
        "Expected format (use quotes around domains with dots):\n[\"{domain}\"]\ntoken = \"your_token_here\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_credentials(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIALS_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_token_for_domain() {
        let (_dir, path) = write_credentials(
            r#"
["gitlab.com"]
token = "glpat-public"

["gitlab.example.com"]
token = "glpat-private"
"#,
        );

        assert_eq!(load_token(&path, "gitlab.com").unwrap(), "glpat-public");
        assert_eq!(
            load_token(&path, "gitlab.example.com").unwrap(),
            "glpat-private"
        );
    }

    #[test]
    fn test_legacy_token_line() {
        let (_dir, path) = write_credentials("# old format\ntoken=glpat-legacy\n");
        assert_eq!(load_token(&path, "gitlab.com").unwrap(), "glpat-legacy");
    }

    #[test]
    fn test_top_level_token_key() {
        let (_dir, path) = write_credentials("token = \"glpat-top\"\n");
        assert_eq!(load_token(&path, "gitlab.com").unwrap(), "glpat-top");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_token(&dir.path().join("credentials"), "gitlab.com").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Credentials file not found"));
        assert!(message.contains("[\"gitlab.com\"]"));
    }

    #[test]
    fn test_unknown_domain() {
        let (_dir, path) = write_credentials("[\"gitlab.com\"]\ntoken = \"x\"\n");
        let err = load_token(&path, "gitlab.example.com").unwrap_err();
        assert!(err
            .to_string()
            .contains("No configuration found for 'gitlab.example.com'"));
    }

    #[test]
    fn test_domain_without_token() {
        let (_dir, path) = write_credentials("[\"gitlab.com\"]\nuser = \"me\"\n");
        let err = load_token(&path, "gitlab.com").unwrap_err();
        assert!(err.to_string().contains("No token found for 'gitlab.com'"));
    }

    #[test]
    fn test_unparseable_file() {
        let (_dir, path) = write_credentials("[[[ not toml");
        let err = load_token(&path, "gitlab.com").unwrap_err();
        assert!(err.to_string().contains("Failed to parse credentials file"));
    }
}
