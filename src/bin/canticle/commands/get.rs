//! `canticle get` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::GetArgs;
use canticle::ops::get;
use canticle::sources::{GitResolver, GoListReader};

pub fn execute(args: GetArgs, workspace: Option<PathBuf>) -> Result<()> {
    let mut ctx = super::context(workspace)?;
    if args.update {
        ctx.config_mut().get.update = Some(true);
    }

    let ws = ctx.workspace()?;
    let reader = GoListReader::new(&ws).with_tests(ctx.config().include_tests());
    let resolver = GitResolver::new(ws);

    let deps = get(&ctx, &reader, &resolver, &args.import_paths)?;
    eprintln!("     Fetched {} packages", deps.len());

    Ok(())
}
