use anyhow::{Context, Result};
use iconsmith_core::CacheScope;

use super::build::cache_for;
use crate::{cli::ProjectArgs, io::check_results, project::Project};

/// Remove generated files of the selected targets and forget their fingerprints.
pub fn clean(args: &ProjectArgs) -> Result<()> {
    let project = Project::load(&args.config)?;
    let cache = cache_for(&project, args);

    let results: Vec<Result<usize>> = project
        .select(&args.targets)?
        .iter()
        .map(|name| {
            let config = project.config(name)?;
            let removed = iconsmith_core::clean(&config)
                .with_context(|| format!("Failed to clean target '{name}'"))?;
            cache.invalidate(&CacheScope::new(name.as_str()))?;
            println!("{name}: removed {removed} files");
            Ok(removed)
        })
        .collect();

    for e in results.iter().filter_map(|r| r.as_ref().err()) {
        eprintln!("{e:?}");
    }
    check_results(&results, "Clean")?;

    let removed: usize = results.iter().filter_map(|r| r.as_ref().ok()).sum();
    println!("Cleaned {removed} files");
    Ok(())
}
