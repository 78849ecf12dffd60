//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ruletree/ruletree.toml`
//! 3. Local config: `<project_dir>/.ruletree.toml`
//! 4. Environment variables: `RULETREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Raw settings for intermediate parsing (`None` = not specified, inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub rules_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub row_height: Option<f32>,
    pub alternating_rows: Option<bool>,
    pub search_case_sensitive: Option<bool>,
}

/// Unified configuration for ruletree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Rule collection file (default: ./ruletree.rules.toml)
    pub rules_file: PathBuf,
    /// Persisted view state (default: <data_dir>/view-state.toml)
    pub state_file: PathBuf,
    /// Row height in pixels
    pub row_height: f32,
    /// Shade every other row
    pub alternating_rows: bool,
    /// Search matches case-sensitively
    pub search_case_sensitive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from("ruletree.rules.toml"),
            state_file: default_state_file(),
            row_height: 16.0,
            alternating_rows: true,
            search_case_sensitive: false,
        }
    }
}

fn default_state_file() -> PathBuf {
    ProjectDirs::from("", "", "ruletree")
        .map(|dirs| dirs.data_dir().join("view-state.toml"))
        .unwrap_or_else(|| PathBuf::from(".ruletree-state.toml"))
}

/// Get the XDG config directory for ruletree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ruletree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ruletree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".ruletree.toml")
}

/// Directory whose `.ruletree.toml` forms the local layer: `project_dir`, else the
/// current working directory.
pub fn project_dir_or_cwd(project_dir: Option<&Path>) -> Result<PathBuf, ApplicationError> {
    match project_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().map_err(|e| ApplicationError::OperationFailed {
            context: "resolve current directory".to_string(),
            source: Box::new(e),
        }),
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            rules_file: overlay
                .rules_file
                .clone()
                .unwrap_or_else(|| self.rules_file.clone()),
            state_file: overlay
                .state_file
                .clone()
                .unwrap_or_else(|| self.state_file.clone()),
            row_height: overlay.row_height.unwrap_or(self.row_height),
            alternating_rows: overlay.alternating_rows.unwrap_or(self.alternating_rows),
            search_case_sensitive: overlay
                .search_case_sensitive
                .unwrap_or(self.search_case_sensitive),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a local `.ruletree.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project-local config
        if let Some(dir) = project_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply RULETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RULETREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("rules_file") {
            settings.rules_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("state_file") {
            settings.state_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_float("row_height") {
            settings.row_height = val as f32;
        }
        if let Ok(val) = config.get_bool("alternating_rows") {
            settings.alternating_rows = val;
        }
        if let Ok(val) = config.get_bool("search_case_sensitive") {
            settings.search_case_sensitive = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(ApplicationError::Config {
                message: format!("row_height must be positive, got {}", self.row_height),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# ruletree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/ruletree/ruletree.toml
#   Local:  <project_dir>/.ruletree.toml
#   Env:    RULETREE_* environment variables

# Rule collection edited by the list
# rules_file = "ruletree.rules.toml"

# Where selection, scroll and column layout are kept between runs
# state_file = "~/.local/share/ruletree/view-state.toml"

# row_height = 16.0
# alternating_rows = true
# search_case_sensitive = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
