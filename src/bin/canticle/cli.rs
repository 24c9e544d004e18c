//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// canticle - fetch and snapshot the dependencies of a GOPATH project
#[derive(Parser)]
#[command(name = "canticle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to [workspace] path, then $GOPATH)
    #[arg(long, global = true, env = "CANTICLE_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every package reachable from the given import paths
    Get(GetArgs),

    /// Record the repositories the current project depends on
    Save(SaveArgs),
}

#[derive(Args)]
pub struct GetArgs {
    /// Import paths to start from (defaults to the current project)
    pub import_paths: Vec<String>,

    /// Move existing checkouts to their declared revisions
    #[arg(short, long)]
    pub update: bool,
}

#[derive(Args)]
pub struct SaveArgs {
    /// Record branch names instead of exact revisions
    #[arg(long)]
    pub branches: bool,

    /// Also follow imports of test files
    #[arg(long)]
    pub tests: bool,

    /// Print the sources as JSON
    #[arg(long)]
    pub json: bool,
}
