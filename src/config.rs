/*!
Application configuration.

Loaded from an optional JSON file, then overridden by environment variables.
Priority: env var > file > default.

The file path is taken from `SOCIAL_SIM_CONFIG`, falling back to `social-sim.json` in the working directory.
A missing or malformed file is not an error; defaults are used and a message is logged.
*/

use std::{path::Path, str::FromStr};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{gui::layout::LayoutKind, network::node::DEFAULT_NODE_COLOR};

pub const CONFIG_PATH_VAR: &str = "SOCIAL_SIM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "social-sim.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeFlavor {
    Latte,
    Frappe,
    Macchiato,
    #[default]
    Mocha,
}

impl FromStr for ThemeFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latte" => Ok(ThemeFlavor::Latte),
            "frappe" => Ok(ThemeFlavor::Frappe),
            "macchiato" => Ok(ThemeFlavor::Macchiato),
            "mocha" => Ok(ThemeFlavor::Mocha),
            other => Err(format!("unknown theme {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seed for the "Add Connection" generator. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Color given to new users.
    pub node_color: String,
    /// Canvas background; `None` keeps the theme's panel color.
    pub background: Option<String>,
    pub layout: LayoutKind,
    /// Start with the four-user sample graph instead of an empty canvas.
    pub sample_graph: bool,
    pub theme: ThemeFlavor,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: None,
            node_color: DEFAULT_NODE_COLOR.to_string(),
            background: None,
            layout: LayoutKind::default(),
            sample_graph: true,
            theme: ThemeFlavor::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_file(Path::new(&path));
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn load_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                debug!("No config file at {}, using env vars / defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let config = serde_json::from_str(contents)?;
        info!("Loaded config file");
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    /// Values that fail to parse are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup("SOCIAL_SIM_SEED") {
            match seed.trim().parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => warn!("Ignoring SOCIAL_SIM_SEED={}: {}", seed, e),
            }
        }
        if let Some(color) = lookup("SOCIAL_SIM_NODE_COLOR") {
            self.node_color = color;
        }
        if let Some(background) = lookup("SOCIAL_SIM_BACKGROUND") {
            self.background = Some(background);
        }
        if let Some(layout) = lookup("SOCIAL_SIM_LAYOUT") {
            match layout.parse() {
                Ok(layout) => self.layout = layout,
                Err(e) => warn!("Ignoring SOCIAL_SIM_LAYOUT: {}", e),
            }
        }
        if let Some(sample) = lookup("SOCIAL_SIM_SAMPLE_GRAPH") {
            match sample.trim().parse() {
                Ok(sample) => self.sample_graph = sample,
                Err(e) => warn!("Ignoring SOCIAL_SIM_SAMPLE_GRAPH={}: {}", sample, e),
            }
        }
        if let Some(theme) = lookup("SOCIAL_SIM_THEME") {
            match theme.parse() {
                Ok(theme) => self.theme = theme,
                Err(e) => warn!("Ignoring SOCIAL_SIM_THEME: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::parse(r#"{"seed": 7, "layout": "grid"}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.layout, LayoutKind::Grid);
        assert_eq!(config.node_color, DEFAULT_NODE_COLOR);
        assert!(config.sample_graph);
        assert_eq!(config.theme, ThemeFlavor::Mocha);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::parse(r#"{"seed": 7, "theme": "latte"}"#).unwrap();
        let env: HashMap<&str, &str> = [
            ("SOCIAL_SIM_SEED", "99"),
            ("SOCIAL_SIM_LAYOUT", "Radial"),
            ("SOCIAL_SIM_SAMPLE_GRAPH", "false"),
            ("SOCIAL_SIM_BACKGROUND", "#ffcc00"),
            ("SOCIAL_SIM_THEME", "nonsense"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.seed, Some(99));
        assert_eq!(config.layout, LayoutKind::Radial);
        assert!(!config.sample_graph);
        assert_eq!(config.background.as_deref(), Some("#ffcc00"));
        // Unparseable values leave the file setting alone
        assert_eq!(config.theme, ThemeFlavor::Latte);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load_file(Path::new("definitely/not/here.json"));
        assert_eq!(config, AppConfig::default());
    }
}
