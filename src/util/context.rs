//! Global context for canticle operations.
//!
//! Provides centralized access to configuration, the workspace and the
//! project being worked on.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::core::{DeclaredDependency, Workspace};
use crate::util::config::{
    default_workspace_root, global_config_path, load_config, project_config_path, Config,
    PROJECT_CONFIG_NAME,
};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Project root; the snapshot is taken from here
    project_root: PathBuf,

    /// Workspace root given on the command line
    workspace_override: Option<PathBuf>,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_cwd(cwd)
    }

    /// Create a GlobalContext with a specific working directory.
    ///
    /// The project root is the nearest directory at or above `cwd` holding
    /// a `Canticle.toml`, or `cwd` itself when there is none.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let project_root = find_project_root(&cwd).unwrap_or_else(|| cwd.clone());

        let global = global_config_path().unwrap_or_default();
        let config = load_config(&global, &project_config_path(&project_root));

        Ok(GlobalContext {
            cwd,
            project_root,
            workspace_override: None,
            config,
        })
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use `root` as the workspace regardless of configuration.
    pub fn with_workspace(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_override = Some(root.into());
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Declared dependency pins of the project.
    pub fn declared(&self) -> &[DeclaredDependency] {
        &self.config.dependencies
    }

    /// Get the workspace root directory.
    ///
    /// Order of precedence: command line, config (relative to the project
    /// root), `$GOPATH`, `~/go`.
    pub fn workspace_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.workspace_override {
            return Ok(self.cwd.join(root));
        }
        if let Some(root) = &self.config.workspace.path {
            return Ok(self.project_root.join(root));
        }
        default_workspace_root()
            .ok_or_else(|| anyhow!("cant determine workspace root, set GOPATH or [workspace] path"))
    }

    pub fn workspace(&self) -> Result<Workspace> {
        self.workspace_root().map(Workspace::new)
    }

    /// Import path of the project root.
    pub fn project_import_path(&self) -> Result<String> {
        let workspace = self.workspace()?;
        workspace.package_name(&self.project_root).with_context(|| {
            format!(
                "project {} is not inside workspace {}",
                self.project_root.display(),
                workspace.root().display()
            )
        })
    }
}

/// Find the nearest directory at or above `start` holding a project config.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG_NAME).is_file())
        .map(Path::to_path_buf)
}
