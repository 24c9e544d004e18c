//! Implementation of `canticle save`.

use anyhow::Result;

use crate::core::{Dependencies, PackageReader};
use crate::resolver::{DependencySaver, DependencySources, DependencyWalker, SourcesResolver};
use crate::sources::RepoResolver;
use crate::util::GlobalContext;

/// Snapshot the project's dependency graph as it exists on disk, and the
/// repositories holding it.
///
/// Nothing is fetched. Packages that could not be read are recorded with
/// their error and logged.
pub fn save(
    ctx: &GlobalContext,
    reader: &dyn PackageReader,
    resolver: &dyn RepoResolver,
) -> Result<(Dependencies, DependencySources)> {
    let workspace = ctx.workspace()?;
    let project = ctx.project_import_path()?;
    let root = ctx.project_root().to_path_buf();
    let config = ctx.config();

    tracing::info!("Saving dependencies of {}", project);
    let saver = DependencySaver::new(reader, workspace.clone(), root.clone())
        .with_no_recur(config.save.no_recur.iter().cloned());
    let mut walker = DependencyWalker::new(saver);
    walker.traverse(root.clone())?;
    let deps = walker.into_visitor().into_dependencies();

    for dep in deps.errors() {
        if let Some(err) = &dep.err {
            tracing::warn!("Package {} recorded with error: {}", dep.import_path, err);
        }
    }

    let sources = SourcesResolver::new(resolver, workspace, root)
        .with_branches(config.branches())
        .with_declared(ctx.declared().to_vec())
        .resolve_sources(&deps)?;
    tracing::info!(
        "Saved {} packages from {} repositories",
        deps.len(),
        sources.len()
    );

    Ok((deps, sources))
}
