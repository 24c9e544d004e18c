//! `canticle save` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::SaveArgs;
use canticle::ops::save;
use canticle::sources::{GitResolver, GoListReader};

pub fn execute(args: SaveArgs, workspace: Option<PathBuf>) -> Result<()> {
    let mut ctx = super::context(workspace)?;
    if args.branches {
        ctx.config_mut().save.branches = Some(true);
    }
    if args.tests {
        ctx.config_mut().save.include_tests = Some(true);
    }

    let ws = ctx.workspace()?;
    let reader = GoListReader::new(&ws).with_tests(ctx.config().include_tests());
    let resolver = GitResolver::new(ws);

    let (deps, sources) = save(&ctx, &reader, &resolver)?;

    if args.json {
        let json = serde_json::to_string_pretty(&sources).context("failed to serialize sources")?;
        println!("{}", json);
    } else {
        print!("{}", sources);
    }

    let broken = deps.errors().count();
    if broken > 0 {
        eprintln!("warning: {} packages could not be read", broken);
    }

    Ok(())
}
