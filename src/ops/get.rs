//! Implementation of `canticle get`.

use anyhow::Result;

use crate::core::{Dependencies, PackageReader};
use crate::resolver::{DependencyLoader, DependencyWalker};
use crate::sources::RepoResolver;
use crate::util::GlobalContext;

/// Fetch every package reachable from `roots`, updating checkouts to their
/// declared revisions when `[get] update` is set.
///
/// With no roots the project's own import path is used.
pub fn get(
    ctx: &GlobalContext,
    reader: &dyn PackageReader,
    resolver: &dyn RepoResolver,
    roots: &[String],
) -> Result<Dependencies> {
    let workspace = ctx.workspace()?;
    let roots = if roots.is_empty() {
        vec![ctx.project_import_path()?]
    } else {
        roots.to_vec()
    };

    let loader = DependencyLoader::new(resolver, reader, ctx.declared().to_vec(), workspace)
        .with_update(ctx.config().update());
    let mut walker = DependencyWalker::new(loader);

    tracing::info!("Getting dependencies of {}", roots.join(", "));
    walker.traverse_all(roots)?;

    let deps = walker.into_visitor().into_dependencies();
    tracing::info!("Loaded {} packages", deps.len());
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DeclaredDependency;
    use crate::test_support::{MockReader, MockResolver, WorkspaceFixture};
    use crate::util::Config;

    fn context(fixture: &WorkspaceFixture, project: &str, config: Config) -> GlobalContext {
        let cwd = fixture.package(project);
        GlobalContext::with_cwd(cwd)
            .unwrap()
            .with_config(config)
            .with_workspace(fixture.path())
    }

    #[test]
    fn test_get_defaults_to_project() {
        let fixture = WorkspaceFixture::new();
        let ws = fixture.workspace();
        let ctx = context(&fixture, "example.org/app", Config::default());

        let reader = MockReader::new()
            .imports(ws.package_source("example.org/app"), &["github.com/foo/bar"])
            .imports(ws.package_source("github.com/foo/bar"), &["github.com/foo/baz"]);
        let resolver = MockResolver::new(&ws)
            .repo("github.com/foo/bar", "b1", "https://github.com/foo/bar")
            .repo("github.com/foo/baz", "z1", "https://github.com/foo/baz");

        let deps = get(&ctx, &reader, &resolver, &[]).unwrap();

        assert_eq!(
            deps.import_paths().collect::<Vec<_>>(),
            vec!["example.org/app", "github.com/foo/bar", "github.com/foo/baz"]
        );
        assert_eq!(
            resolver.created(),
            vec![
                ("github.com/foo/bar".to_string(), None),
                ("github.com/foo/baz".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_get_shares_visits_across_roots() {
        let fixture = WorkspaceFixture::new();
        fixture.package("example.org/one");
        fixture.package("example.org/two");
        fixture.package("example.org/shared");
        let ws = fixture.workspace();
        let ctx = context(&fixture, "example.org/app", Config::default());

        let reader = MockReader::new()
            .imports(ws.package_source("example.org/one"), &["example.org/shared"])
            .imports(ws.package_source("example.org/two"), &["example.org/shared"]);
        let resolver = MockResolver::new(&ws);

        let roots = vec!["example.org/one".to_string(), "example.org/two".to_string()];
        let deps = get(&ctx, &reader, &resolver, &roots).unwrap();

        assert_eq!(deps.len(), 3);
        let shared = ws.package_source("example.org/shared");
        assert_eq!(reader.reads().iter().filter(|p| **p == shared).count(), 1);
        assert_eq!(
            deps.dependency("example.org/shared").unwrap().imported_from.to_vec(),
            vec!["example.org/one", "example.org/two"]
        );
    }

    #[test]
    fn test_get_update_uses_declared_revisions() {
        let fixture = WorkspaceFixture::new();
        fixture.package("github.com/foo/bar");
        let ws = fixture.workspace();

        let mut config = Config::default();
        config.get.update = Some(true);
        config
            .dependencies
            .push(DeclaredDependency::new("github.com/foo/bar").with_revision("v3"));
        let ctx = context(&fixture, "example.org/app", config);

        let reader = MockReader::new()
            .imports(ws.package_source("example.org/app"), &["github.com/foo/bar"]);
        let resolver = MockResolver::new(&ws).repo("github.com/foo/bar", "b1", "https://github.com/foo/bar");

        get(&ctx, &reader, &resolver, &[]).unwrap();

        assert_eq!(
            resolver.revisions_set(),
            vec![("github.com/foo/bar".to_string(), "v3".to_string())]
        );
    }

    #[test]
    fn test_get_fails_outside_workspace() {
        let fixture = WorkspaceFixture::new();
        let other = WorkspaceFixture::new();
        let ctx = GlobalContext::with_cwd(other.path().to_path_buf())
            .unwrap()
            .with_config(Config::default())
            .with_workspace(fixture.path());

        let reader = MockReader::new();
        let resolver = MockResolver::new(&fixture.workspace());

        let err = get(&ctx, &reader, &resolver, &[]).unwrap_err();
        assert!(err.to_string().contains("is not inside workspace"));
    }
}
