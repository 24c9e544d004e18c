//! Package reader backed by `go list`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::core::package::{is_remote, PackageError, PackageImports, PackageReader, ReadError};
use crate::core::Workspace;
use crate::util::process::{find_executable, ProcessBuilder};

/// The subset of `go list --json` output we care about.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GoPackage {
    /// Directory containing the package sources
    pub dir: String,

    /// Import path of the package in dir
    pub import_path: String,

    pub name: String,

    /// Import paths used by this package
    pub imports: Vec<String>,

    /// Imports from in-package test files
    pub test_imports: Vec<String>,

    /// Imports from external test files
    #[serde(rename = "XTestImports")]
    pub xtest_imports: Vec<String>,

    /// Error loading this package (not its dependencies)
    pub error: Option<PackageError>,
}

impl GoPackage {
    /// Remote imports of the package, sorted and deduplicated.
    pub fn remote_imports(&self, include_tests: bool) -> Vec<String> {
        let mut imports: BTreeSet<&str> = self
            .imports
            .iter()
            .map(String::as_str)
            .filter(|i| is_remote(i))
            .collect();

        if include_tests {
            imports.extend(
                self.test_imports
                    .iter()
                    .chain(&self.xtest_imports)
                    .map(String::as_str)
                    .filter(|i| is_remote(i)),
            );
        }

        imports.into_iter().map(str::to_string).collect()
    }
}

/// Reads package imports by running `go list --json -e` in GOPATH mode.
#[derive(Debug, Clone)]
pub struct GoListReader {
    go: PathBuf,
    workspace: PathBuf,
    include_tests: bool,
}

impl GoListReader {
    pub fn new(workspace: &Workspace) -> Self {
        GoListReader {
            go: find_executable("go").unwrap_or_else(|| PathBuf::from("go")),
            workspace: workspace.root().to_path_buf(),
            include_tests: false,
        }
    }

    /// Also report imports from test files.
    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    /// Use a specific go binary.
    pub fn with_go(mut self, go: impl Into<PathBuf>) -> Self {
        self.go = go.into();
        self
    }

    fn command(&self, dir: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.go)
            .args(["list", "--json", "-e"])
            .arg(dir)
            .env("GOPATH", self.workspace.to_string_lossy())
            .env("GO111MODULE", "off")
            .cwd(dir)
    }

    /// Describe the package in a directory.
    pub fn load_package(&self, dir: &Path) -> Result<GoPackage, ReadError> {
        let cmd = self.command(dir);
        tracing::debug!("Running command {}", cmd.display_command());

        let output = cmd.exec_and_check()?;
        let package = serde_json::from_slice(&output.stdout).with_context(|| {
            format!("failed to parse `{}` output", cmd.display_command())
        })?;
        Ok(package)
    }
}

impl PackageReader for GoListReader {
    fn read_imports(&self, dir: &Path) -> PackageImports {
        let package = match self.load_package(dir) {
            Ok(package) => package,
            Err(err) => return PackageImports::failed(err),
        };

        PackageImports {
            imports: package.remote_imports(self.include_tests),
            error: package.error.map(ReadError::Package),
        }
    }
}
