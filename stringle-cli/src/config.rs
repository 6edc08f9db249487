use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::{Result, StringleError};

/// File name looked up in the root directory of a run
pub const PROJECT_CONFIG_FILE: &str = ".stringle.toml";

/// Settings read from `config.toml` / `.stringle.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filters: FilterSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[filters]` table. Lists extend whatever the command line supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSection {
    #[serde(default)]
    pub ignore_dirs: Vec<String>,

    #[serde(default)]
    pub ignore_files: Vec<PathBuf>,

    #[serde(default)]
    pub ignore_extensions: Vec<String>,

    #[serde(default)]
    pub include_extensions: Vec<String>,
}

/// `[run]` table. Unset values fall back to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSection {
    #[serde(default)]
    pub case_sensitive: Option<bool>,

    #[serde(default)]
    pub use_regex: Option<bool>,
}

impl Config {
    /// Load the project file under `root` if there is one, otherwise the
    /// global file, otherwise defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let project = Self::project_config_path(root);
        if project.is_file() {
            debug!("Using project config {}", project.display());
            return Self::load_from_file(&project);
        }

        if let Some(global) = Self::global_config_path() {
            if global.is_file() {
                debug!("Using global config {}", global.display());
                return Self::load_from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            StringleError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::parse(&contents)
            .map_err(|e| StringleError::ConfigError(format!("{}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Relative `ignore_files` entries are relative to the config file, not to
    /// wherever the process was started
    fn resolve_paths(&mut self, base: &Path) {
        for file in &mut self.filters.ignore_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// `~/.config/stringle/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("stringle").join("config.toml"))
    }

    pub fn project_config_path(root: &Path) -> PathBuf {
        root.join(PROJECT_CONFIG_FILE)
    }
}
