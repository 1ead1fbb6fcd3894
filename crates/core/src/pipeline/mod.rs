//! The per-target build: cache check, stale cleanup, codepoints, fonts,
//! stylesheet, demo page, cache commit.

pub mod clean;
pub mod fonts;
pub mod stylesheet;

use std::{fs::create_dir_all, path::PathBuf, time::Instant};

use iconsmith_backend::{Codepoints, FontArtifact, GlyphSource};
use iconsmith_codepoints::CodepointAllocator;
use log::info;

use crate::{
    cache::{BuildCache, CacheScope, ExpectedOutputs},
    config::BuildConfig,
    error::{Error, Result},
};

pub use clean::clean;
pub use fonts::{WrittenFonts, generate_fonts};
pub use stylesheet::{StyleWriter, glyph_entries};

/// Version mixed into cache fingerprints.
pub const TOOL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// One named build: glyph sources plus their effective config.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub sources: Vec<GlyphSource>,
    pub config: BuildConfig,
}

impl Target {
    pub fn new(name: impl Into<String>, sources: Vec<GlyphSource>, config: BuildConfig) -> Self {
        Self { name: name.into(), sources, config }
    }

    fn scope(&self) -> CacheScope {
        CacheScope::new(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub font_name: String,
    pub codepoints: Codepoints,
    /// Fonts left on disk; embedded ones are gone.
    pub fonts: Vec<FontArtifact>,
    pub stylesheet: PathBuf,
    pub demo: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// Inputs unchanged and outputs present.
    Skipped,
    Built(BuildSummary),
}

// ============================================================================
// Pipeline
// ============================================================================

fn run_step<T>(
    target: &str,
    name: &str,
    step_num: usize,
    total: usize,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    println!("\n[{target}] [{step_num}/{total}] {name}");
    let start = Instant::now();
    let value = f()?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(value)
}

/// Build `target`, or skip it when `cache` says nothing changed.
pub fn build(target: &Target, cache: Option<&BuildCache>) -> Result<BuildOutcome> {
    let config = &target.config;
    prepare_dirs(config)?;

    if let Some(cache) = cache {
        let expected = ExpectedOutputs::for_config(config);
        if cache.should_skip(&target.scope(), &target.sources, config, TOOL_VERSION, &expected)? {
            info!("{}: up to date", target.name);
            return Ok(BuildOutcome::Skipped);
        }
    }

    let total = if config.html_demo { 5 } else { 4 };
    run_step(&target.name, "Remove stale outputs", 1, total, || {
        let removed = clean(config)?;
        println!("  Removed {removed} files");
        Ok(())
    })?;

    let codepoints = run_step(&target.name, "Assign codepoints", 2, total, || {
        allocate_codepoints(config, &target.sources)
    })?;

    let fonts = run_step(&target.name, "Generate fonts", 3, total, || {
        generate_fonts(config, &target.sources, &codepoints)
    })?;

    let writer = StyleWriter::new(
        config,
        &fonts.font_name,
        glyph_entries(&fonts.glyph_names, &codepoints)?,
    )?;
    let stylesheet =
        run_step(&target.name, "Write stylesheet", 4, total, || writer.write_stylesheet())?;
    let demo = if config.html_demo {
        Some(run_step(&target.name, "Write demo page", 5, total, || writer.write_demo())?)
    } else {
        None
    };

    if let Some(cache) = cache {
        cache.commit(&target.scope(), &target.sources, config, TOOL_VERSION)?;
    }

    println!("Font '{}' with {} glyphs created.", fonts.font_name, fonts.glyph_names.len());

    let embedded = writer.embedded().formats.clone();
    Ok(BuildOutcome::Built(BuildSummary {
        font_name: fonts.font_name.clone(),
        codepoints,
        fonts: fonts.artifacts.into_iter().filter(|a| !embedded.contains(&a.format)).collect(),
        stylesheet,
        demo,
    }))
}

fn prepare_dirs(config: &BuildConfig) -> Result<()> {
    for dir in [&config.dest, &config.dest_css, &config.dest_html] {
        create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    Ok(())
}

/// Explicit codepoints first, then the private use area for the rest.
pub fn allocate_codepoints(config: &BuildConfig, sources: &[GlyphSource]) -> Result<Codepoints> {
    let allocator = CodepointAllocator::new()
        .with_base(config.start_codepoint)
        .with_explicit(config.codepoints.iter().map(|(name, cp)| (name.as_str(), *cp)));
    let names = sources.iter().map(|s| s.name.as_str());
    if config.codepoints_complete {
        allocator.require_complete(names.clone())?;
    }
    Ok(allocator.allocate(names)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> GlyphSource {
        GlyphSource::new(name, format!("{name}.svg"), b"<svg/>".to_vec())
    }

    #[test]
    fn test_allocate_codepoints() {
        let config = BuildConfig::new("out").with_codepoints([("search".to_string(), 0xF101)]);
        let codepoints =
            allocate_codepoints(&config, &[source("home"), source("search"), source("star")])
                .unwrap();
        assert_eq!(codepoints["search"], 0xF101);
        assert_eq!(codepoints["home"], 0xF102);
        assert_eq!(codepoints["star"], 0xF103);
        assert_eq!(codepoints.keys().collect::<Vec<_>>(), ["home", "search", "star"]);
    }

    #[test]
    fn test_complete_codepoints_required() {
        let mut config = BuildConfig::new("out").with_codepoints([("home".to_string(), 0xE000)]);
        config.codepoints_complete = true;
        assert!(allocate_codepoints(&config, &[source("home")]).is_ok());
        assert!(matches!(
            allocate_codepoints(&config, &[source("home"), source("star")]),
            Err(Error::Codepoints(_))
        ));
    }

    #[test]
    fn test_shared_explicit_codepoint_rejected() {
        let config = BuildConfig::new("out")
            .with_codepoints([("a".to_string(), 0xF101), ("b".to_string(), 0xF101)]);
        let err = allocate_codepoints(&config, &[source("a"), source("b")]).unwrap_err();
        assert!(matches!(
            err,
            Error::Codepoints(iconsmith_codepoints::Error::DuplicateCodepoint { value: 0xF101, .. })
        ));
    }
}
