//! Configuration file support for canticle.
//!
//! canticle supports two configuration file locations:
//! - Global: `~/.canticle/config.toml` - User-wide defaults
//! - Project: `Canticle.toml` at the project root - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::DeclaredDependency;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_NAME: &str = "Canticle.toml";

/// canticle configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace settings
    pub workspace: WorkspaceConfig,

    /// Snapshot settings
    pub save: SaveConfig,

    /// Fetch settings
    pub get: GetConfig,

    /// Declared dependency pins
    pub dependencies: Vec<DeclaredDependency>,
}

/// Workspace-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root (None = $GOPATH, then ~/go)
    pub path: Option<PathBuf>,
}

/// Snapshot-related configuration.
///
/// Flags are optional so a project file can turn off what the global file
/// turned on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Record branch names rather than exact revisions
    pub branches: Option<bool>,

    /// Directory names the snapshot never recurses into
    pub no_recur: Vec<String>,

    /// Also follow imports of test files. `get` reads this setting too, so
    /// both commands see the same graph.
    pub include_tests: Option<bool>,
}

/// Fetch-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetConfig {
    /// Move existing checkouts to their declared revisions
    pub update: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.workspace.path.is_some() {
            self.workspace.path = other.workspace.path;
        }

        if other.save.branches.is_some() {
            self.save.branches = other.save.branches;
        }
        if !other.save.no_recur.is_empty() {
            self.save.no_recur = other.save.no_recur;
        }
        if other.save.include_tests.is_some() {
            self.save.include_tests = other.save.include_tests;
        }

        if other.get.update.is_some() {
            self.get.update = other.get.update;
        }

        // A pin for the same root replaces the earlier one.
        for pin in other.dependencies {
            match self.dependencies.iter_mut().find(|d| d.root == pin.root) {
                Some(existing) => *existing = pin,
                None => self.dependencies.push(pin),
            }
        }
    }
}

impl Config {
    /// Record branch names rather than exact revisions.
    pub fn branches(&self) -> bool {
        self.save.branches.unwrap_or(false)
    }

    /// Follow imports of test files, for both `get` and `save`.
    pub fn include_tests(&self) -> bool {
        self.save.include_tests.unwrap_or(false)
    }

    /// Move existing checkouts to their declared revisions.
    pub fn update(&self) -> bool {
        self.get.update.unwrap_or(false)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (Canticle.toml)
/// 2. Global config (~/.canticle/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global canticle config directory (~/.canticle).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".canticle"))
}

/// Get the global config path (~/.canticle/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (Canticle.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_NAME)
}

/// Default workspace root: the first `$GOPATH` entry, then `~/go`.
pub fn default_workspace_root() -> Option<PathBuf> {
    std::env::var_os("GOPATH")
        .and_then(|gopath| std::env::split_paths(&gopath).find(|p| !p.as_os_str().is_empty()))
        .or_else(|| directories::BaseDirs::new().map(|b| b.home_dir().join("go")))
}
