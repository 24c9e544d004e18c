//! Command implementations

pub mod get;
pub mod save;

use std::path::PathBuf;

use anyhow::Result;

use canticle::util::GlobalContext;

/// Context for the current directory, honoring `--workspace`.
pub fn context(workspace: Option<PathBuf>) -> Result<GlobalContext> {
    let ctx = GlobalContext::new()?;
    Ok(match workspace {
        Some(root) => ctx.with_workspace(root),
        None => ctx,
    })
}
