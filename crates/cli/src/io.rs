//! Source discovery and result reporting.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use glob::glob;

const GLOB_CHARS: [char; 4] = ['*', '?', '[', '{'];

/// Expand `patterns` relative to `base_dir` into SVG files.
///
/// Matches keep pattern order and are sorted within a pattern; a file
/// matched twice is kept once.
pub fn glob_sources(base_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut sources: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let pattern = base_dir.join(pattern);
        let pattern_str = pattern.to_str().context("Invalid pattern path")?;
        let mut matched: Vec<PathBuf> = glob(pattern_str)
            .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        matched.sort();
        for path in matched {
            if !sources.contains(&path) {
                sources.push(path);
            }
        }
    }
    Ok(sources)
}

/// Leading directories of `pattern` free of glob syntax.
///
/// `icons/**/*.svg` gives `{base_dir}/icons`.
pub fn pattern_root(base_dir: &Path, pattern: &str) -> PathBuf {
    let literal: PathBuf = Path::new(pattern)
        .components()
        .take_while(|c| match c {
            Component::Normal(part) => !part.to_string_lossy().contains(GLOB_CHARS),
            _ => true,
        })
        .collect();
    // A pattern without wildcards names a file; its parent is the root.
    let literal = if literal == Path::new(pattern) {
        literal.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        literal
    };
    base_dir.join(literal)
}

/// Check batch operation results and report failures.
pub fn check_results<T>(results: &[Result<T>], operation: &str) -> Result<()> {
    let failed_count = results.iter().filter(|r| r.is_err()).count();
    if failed_count > 0 {
        bail!("{operation} failed for {failed_count} targets");
    }
    Ok(())
}
