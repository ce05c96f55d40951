//! Application configuration management

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page attribute defaults
    pub page: PageConfig,
    /// Editor settings
    pub editor: EditorConfig,
    /// Scroll sync settings
    pub sync: SyncConfig,
    /// UI settings
    pub ui: UiConfig,
    /// Recently opened reference URLs, most recent first
    pub recent_references: Vec<String>,
}

/// Defaults for the page attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Page identifier used when none is given on the command line
    pub default_page_id: Option<String>,
    /// Reference URL loaded on start
    pub default_reference: Option<String>,
}

/// Editor-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font size in pixels
    pub font_size: f32,
    /// Quiet period before typed text is saved, in milliseconds
    pub save_debounce_ms: u64,
}

/// Scroll sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Whether sync starts enabled
    pub enabled_on_start: bool,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Share of the window width given to the notes panel
    pub notes_width_fraction: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            save_debounce_ms: 350,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled_on_start: true,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            notes_width_fraction: 0.5,
        }
    }
}

impl EditorConfig {
    /// Debounce interval for note saves
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }
}

/// Page attributes, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAttributes {
    /// Identifier the notes are stored under
    pub page_id: String,
    /// Reference loaded automatically, if any
    pub default_reference: Option<String>,
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "refnotes", "RefNotes")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config directory")?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Malformed config {}", path.display()))
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Add a URL to the recent references
    pub fn add_recent_reference(&mut self, url: &str) {
        // Remove if already exists
        self.recent_references.retain(|u| u != url);
        // Add to front
        self.recent_references.insert(0, url.to_string());
        // Keep only last 10
        self.recent_references.truncate(10);
    }

    /// Resolve the page attributes, letting command-line values win
    pub fn page_attributes(
        &self,
        page_id: Option<String>,
        reference: Option<String>,
    ) -> PageAttributes {
        let page_id = non_empty(page_id)
            .or_else(|| non_empty(self.page.default_page_id.clone()))
            .unwrap_or_else(|| {
                std::env::current_dir()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|_| "default".to_string())
            });

        PageAttributes {
            page_id,
            default_reference: non_empty(reference)
                .or_else(|| non_empty(self.page.default_reference.clone())),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "editor": { "font_size": 18.0 } }"#).unwrap();
        assert_eq!(config.editor.font_size, 18.0);
        assert_eq!(config.editor.save_debounce(), Duration::from_millis(350));
        assert!(config.sync.enabled_on_start);
        assert_eq!(config.ui.theme, "dark");
    }

    #[test]
    fn test_recent_references_are_deduplicated() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.add_recent_reference(&format!("https://example.com/{}", i));
        }
        config.add_recent_reference("https://example.com/5");

        assert_eq!(config.recent_references.len(), 10);
        assert_eq!(config.recent_references[0], "https://example.com/5");
        assert_eq!(
            config
                .recent_references
                .iter()
                .filter(|u| u.as_str() == "https://example.com/5")
                .count(),
            1
        );
    }

    #[test]
    fn test_command_line_overrides_page_defaults() {
        let mut config = AppConfig::default();
        config.page.default_page_id = Some("from-config".into());
        config.page.default_reference = Some("https://example.com/ref".into());

        let attrs = config.page_attributes(Some("cli-page".into()), None);
        assert_eq!(attrs.page_id, "cli-page");
        assert_eq!(attrs.default_reference.as_deref(), Some("https://example.com/ref"));

        let attrs = config.page_attributes(Some("   ".into()), Some(" ".into()));
        assert_eq!(attrs.page_id, "from-config");
        assert_eq!(attrs.default_reference.as_deref(), Some("https://example.com/ref"));
    }

    #[test]
    fn test_config_file_round_trip_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(loaded.recent_references.is_empty());

        let mut config = AppConfig::default();
        config.ui.theme = "light".into();
        config.add_recent_reference("https://example.com/paper");
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ui.theme, "light");
        assert_eq!(loaded.recent_references, vec!["https://example.com/paper".to_string()]);

        fs::write(&path, "{ \"ui\": ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed config"));
    }

    #[test]
    fn test_page_id_falls_back_to_working_directory() {
        let attrs = AppConfig::default().page_attributes(None, None);
        assert!(!attrs.page_id.is_empty());
        assert_eq!(attrs.default_reference, None);
    }
}
