use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "gitlab-tui";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// User configuration for gitlab-tui.
///
/// Read from `~/.config/gitlab-tui/config.toml` unless another path is given.
/// Every section and key is optional; missing values fall back to the defaults
/// below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub icons: IconsConfig,

    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab instance base URL
    pub url: Option<String>,

    /// Branch whose pipelines are listed
    pub branch: Option<String>,

    /// Project path (e.g., 'group/project') or numeric ID
    pub project: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UiConfig {
    /// Seconds between automatic refreshes in watch mode, 0 disables
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayConfig {
    /// strftime pattern for pipeline timestamps
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Number of pipelines fetched per refresh
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Icons shown next to job and pipeline statuses.
///
/// The defaults are Nerd Font glyphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IconsConfig {
    pub default_icon: String,
    pub success: String,
    pub failed: String,
    pub running: String,
    pub pending: String,
    pub canceled: String,
    pub created: String,
    pub manual: String,
    pub skipped: String,
}

/// Hex colours used by the tables and the watch view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ThemeConfig {
    pub name: String,
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub foreground: String,
    pub success: String,
    pub warning: String,
    pub error: String,
    pub muted: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_refresh: default_auto_refresh(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            per_page: default_per_page(),
        }
    }
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            default_icon: "?".to_string(),
            success: "\u{f058}".to_string(),
            failed: "\u{f530}".to_string(),
            running: "\u{f042}".to_string(),
            pending: "\u{ebb5}".to_string(),
            canceled: "\u{eabd}".to_string(),
            created: "\u{f1ce}".to_string(),
            manual: "\u{f013}".to_string(),
            skipped: "\u{f192}".to_string(),
        }
    }
}

impl IconsConfig {
    /// Icon for a GitLab status string, `default_icon` when the status is unknown.
    pub fn get(&self, status: &str) -> &str {
        match status {
            "success" => &self.success,
            "failed" => &self.failed,
            "running" => &self.running,
            "pending" | "waiting_for_resource" | "preparing" => &self.pending,
            "canceled" | "canceling" => &self.canceled,
            "created" | "scheduled" => &self.created,
            "manual" => &self.manual,
            "skipped" => &self.skipped,
            _ => &self.default_icon,
        }
    }
}

impl Default for ThemeConfig {
    // Catppuccin Mocha
    fn default() -> Self {
        Self {
            name: "catppuccin-mocha".to_string(),
            primary: "#cba6f7".to_string(),
            secondary: "#89b4fa".to_string(),
            accent: "#f5c2e7".to_string(),
            foreground: "#cdd6f4".to_string(),
            success: "#a6e3a1".to_string(),
            warning: "#f9e2af".to_string(),
            error: "#f38ba8".to_string(),
            muted: "#9399b2".to_string(),
        }
    }
}

fn default_auto_refresh() -> u64 {
    300
}

fn default_timestamp_format() -> String {
    "%m/%d/%y %H:%M".to_string()
}

fn default_per_page() -> u32 {
    10
}

/// Whether an environment flag such as `DEBUG` or `MOCK_MODE` is switched on.
pub fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| is_truthy(&value))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// `~/.config/gitlab-tui`, or `None` when the home directory is unknown.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(APP_DIR_NAME))
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        match config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)) {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
        };

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
