use crate::config::{Config, IconsConfig, ThemeConfig};

/// Icon and colour lookup for GitLab status strings.
#[derive(Debug, Clone, Copy)]
pub struct StatusPalette<'a> {
    icons: &'a IconsConfig,
    theme: &'a ThemeConfig,
}

impl<'a> StatusPalette<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            icons: &config.icons,
            theme: &config.theme,
        }
    }

    pub fn theme(&self) -> &'a ThemeConfig {
        self.theme
    }

    pub fn icon(&self, status: &str) -> &'a str {
        self.icons.get(status)
    }

    /// Theme colour for a status; unknown statuses are muted.
    pub fn color(&self, status: &str) -> &'a str {
        let theme = self.theme;
        match status {
            "success" => &theme.success,
            "failed" => &theme.error,
            "running" | "pending" | "waiting_for_resource" | "preparing" => &theme.secondary,
            "created" | "scheduled" => &theme.accent,
            "manual" => &theme.primary,
            _ => &theme.muted,
        }
    }

    /// `"<icon> <text>"`
    pub fn label(&self, status: &str, text: &str) -> String {
        format!("{} {text}", self.icon(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses() {
        let config = Config::default();
        let palette = StatusPalette::new(&config);

        assert_eq!(palette.color("success"), config.theme.success);
        assert_eq!(palette.color("failed"), config.theme.error);
        assert_eq!(palette.color("running"), config.theme.secondary);
        assert_eq!(palette.color("manual"), config.theme.primary);
        assert_eq!(palette.icon("failed"), config.icons.failed);
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let config = Config::default();
        let palette = StatusPalette::new(&config);

        assert_eq!(palette.color("canceled"), config.theme.muted);
        assert_eq!(palette.color("bogus"), config.theme.muted);
        assert_eq!(palette.label("bogus", "main"), "? main");
    }
}
