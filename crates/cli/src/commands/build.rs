use anyhow::{Context, Result};
use iconsmith_core::{BuildCache, BuildOutcome};
use log::debug;

use crate::{
    cli::ProjectArgs,
    parallel::{process_parallel_iter, with_jobs},
    project::{DEFAULT_CACHE_DIR, Project},
};

/// Build the selected targets in parallel.
pub fn build(args: &ProjectArgs, no_cache: bool, jobs: Option<usize>) -> Result<()> {
    let project = Project::load(&args.config)?;
    let names = project.select(&args.targets)?;
    let cache = (!no_cache).then(|| cache_for(&project, args));
    if let Some(cache) = &cache {
        debug!("Cache root: {}", cache.root().display());
    }

    let result = with_jobs(jobs, || {
        process_parallel_iter("Build", names, |name| build_target(&project, &name, cache.as_ref()))
    })??;
    result.ok_or_bail("Build")
}

pub(crate) fn cache_for(project: &Project, args: &ProjectArgs) -> BuildCache {
    BuildCache::new(
        args.cache_dir.clone().unwrap_or_else(|| project.base_dir().join(DEFAULT_CACHE_DIR)),
    )
}

fn build_target(project: &Project, name: &str, cache: Option<&BuildCache>) -> Result<()> {
    let target = project.target(name)?;
    let outcome = iconsmith_core::build(&target, cache)
        .with_context(|| format!("Failed to build target '{name}'"))?;
    if let BuildOutcome::Skipped = outcome {
        println!("{name}: up to date, skipped");
    }
    Ok(())
}
