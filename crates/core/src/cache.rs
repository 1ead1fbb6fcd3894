//! Content-addressed build cache.
//!
//! A target is skipped when the fingerprint of its inputs matches the one
//! stored after its last successful build and all of its outputs are still
//! on disk. The fingerprint covers every glyph source's name and bytes, the
//! effective config, and the tool version.

use std::{
    fs::{create_dir_all, read_to_string, remove_dir_all, write},
    path::{Path, PathBuf},
};

use glob::glob;
use iconsmith_backend::GlyphSource;
use log::debug;
use sha2::{Digest, Sha256};

use crate::{
    config::BuildConfig,
    error::{Error, Result},
    pipeline::clean::font_patterns,
};

/// Namespace of this tool's entries under the cache root.
pub const PLUGIN_NAME: &str = "iconsmith";

const HASH_FILE: &str = "hash";

/// Cache namespace of one build target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheScope {
    pub plugin: String,
    pub target: String,
}

impl CacheScope {
    pub fn new(target: impl Into<String>) -> Self {
        Self { plugin: PLUGIN_NAME.to_string(), target: target.into() }
    }
}

/// Fingerprint of one target's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub scope: CacheScope,
    pub hash: String,
}

impl CacheEntry {
    pub fn compute(
        scope: CacheScope,
        sources: &[GlyphSource],
        config: &BuildConfig,
        tool_version: &str,
    ) -> Result<Self> {
        Ok(Self { scope, hash: fingerprint(sources, config, tool_version)? })
    }
}

/// Hex SHA-256 over sources, config and tool version.
///
/// Names and bytes are length-prefixed so adjacent fields cannot shift into
/// each other.
pub fn fingerprint(sources: &[GlyphSource], config: &BuildConfig, tool_version: &str) -> Result<String> {
    let mut hasher = Sha256::new();
    for source in sources {
        hasher.update((source.name.len() as u64).to_le_bytes());
        hasher.update(source.name.as_bytes());
        hasher.update((source.bytes.len() as u64).to_le_bytes());
        hasher.update(&source.bytes);
    }
    hasher.update(serde_json::to_vec(config)?);
    hasher.update(tool_version.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Files a finished build leaves behind.
#[derive(Debug, Clone, Default)]
pub struct ExpectedOutputs {
    /// Alternative glob patterns per linked font; one of each must match.
    pub fonts: Vec<[String; 2]>,
    pub files: Vec<PathBuf>,
}

impl ExpectedOutputs {
    /// Linked fonts (matched with or without a hash suffix, which is unknown
    /// before generation), the stylesheet, and the demo when enabled.
    pub fn for_config(config: &BuildConfig) -> Self {
        let embedded = config.embedded_formats();
        let fonts = config
            .types
            .iter()
            .filter(|f| !embedded.contains(*f))
            .map(|&f| font_patterns(&config.dest, &config.font_base_name, f))
            .collect();

        let mut files = vec![config.stylesheet_file()];
        if config.html_demo {
            files.push(config.demo_file());
        }
        Self { fonts, files }
    }

    pub fn all_exist(&self) -> bool {
        let fonts_exist = self.fonts.iter().all(|patterns| {
            patterns
                .iter()
                .any(|pattern| glob(pattern).is_ok_and(|mut paths| paths.any(|p| p.is_ok())))
        });
        fonts_exist && self.files.iter().all(|f| f.is_file())
    }
}

/// Stored fingerprints under `{root}/{plugin}/{target}/hash`.
#[derive(Debug, Clone)]
pub struct BuildCache {
    root: PathBuf,
}

impl BuildCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scope_dir(&self, scope: &CacheScope) -> PathBuf {
        self.root.join(&scope.plugin).join(&scope.target)
    }

    /// Fingerprint stored by the last successful build, if any.
    pub fn stored(&self, scope: &CacheScope) -> Option<String> {
        read_to_string(self.scope_dir(scope).join(HASH_FILE)).ok().map(|s| s.trim().to_string())
    }

    pub fn is_fresh(&self, entry: &CacheEntry, expected: &ExpectedOutputs) -> bool {
        match self.stored(&entry.scope) {
            Some(stored) if stored == entry.hash => {
                let complete = expected.all_exist();
                if !complete {
                    debug!("{}: fingerprint matches but outputs are missing", entry.scope.target);
                }
                complete
            }
            _ => false,
        }
    }

    pub fn store(&self, entry: &CacheEntry) -> Result<()> {
        let dir = self.scope_dir(&entry.scope);
        create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        let path = dir.join(HASH_FILE);
        write(&path, &entry.hash).map_err(|e| Error::io(&path, e))
    }

    /// Whether a build of `sources` with `config` would change nothing.
    pub fn should_skip(
        &self,
        scope: &CacheScope,
        sources: &[GlyphSource],
        config: &BuildConfig,
        tool_version: &str,
        expected: &ExpectedOutputs,
    ) -> Result<bool> {
        let entry = CacheEntry::compute(scope.clone(), sources, config, tool_version)?;
        Ok(self.is_fresh(&entry, expected))
    }

    /// Record a successful build.
    pub fn commit(
        &self,
        scope: &CacheScope,
        sources: &[GlyphSource],
        config: &BuildConfig,
        tool_version: &str,
    ) -> Result<()> {
        self.store(&CacheEntry::compute(scope.clone(), sources, config, tool_version)?)
    }

    /// Forget a target.
    pub fn invalidate(&self, scope: &CacheScope) -> Result<()> {
        let dir = self.scope_dir(scope);
        if dir.exists() {
            remove_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::TempDir;

    use super::*;

    const VERSION: &str = "iconsmith-core 0.0.0";

    fn sources() -> Vec<GlyphSource> {
        vec![
            GlyphSource::new("home", "home.svg", b"<svg>home</svg>".to_vec()),
            GlyphSource::new("search", "search.svg", b"<svg>search</svg>".to_vec()),
        ]
    }

    #[test]
    fn test_fingerprint_sensitivity() {
        let config = BuildConfig::new("out");
        let base = fingerprint(&sources(), &config, VERSION).unwrap();
        assert_eq!(base, fingerprint(&sources(), &config, VERSION).unwrap());
        assert_eq!(base.len(), 64);

        let mut changed = sources();
        changed[1].bytes[0] = b'[';
        assert_ne!(base, fingerprint(&changed, &config, VERSION).unwrap());

        let renamed = config.clone().with_font_name("glyphs");
        assert_ne!(base, fingerprint(&sources(), &renamed, VERSION).unwrap());

        assert_ne!(base, fingerprint(&sources(), &config, "iconsmith-core 9.9.9").unwrap());
    }

    #[test]
    fn test_fingerprint_covers_glyph_names() {
        let config = BuildConfig::new("out");
        let base = fingerprint(&sources(), &config, VERSION).unwrap();

        let mut renamed = sources();
        renamed[0].name = "house".to_string();
        assert_ne!(base, fingerprint(&renamed, &config, VERSION).unwrap());

        // Field boundaries are part of the hash.
        let split = |name: &str, bytes: &[u8]| vec![GlyphSource::new(name, "a.svg", bytes.to_vec())];
        assert_ne!(
            fingerprint(&split("ab", b"c"), &config, VERSION).unwrap(),
            fingerprint(&split("a", b"bc"), &config, VERSION).unwrap()
        );
    }

    #[test]
    fn test_skip_requires_hash_and_outputs() {
        let dir = TempDir::new().unwrap();
        let cache = BuildCache::new(dir.path().join("cache"));
        let config = BuildConfig::new(dir.path().join("out")).with_types([crate::FontFormat::Woff]);
        let scope = CacheScope::new("icons");
        let expected = ExpectedOutputs::for_config(&config);

        assert!(!cache.should_skip(&scope, &sources(), &config, VERSION, &expected).unwrap());

        cache.commit(&scope, &sources(), &config, VERSION).unwrap();
        assert!(dir.path().join("cache/iconsmith/icons/hash").is_file());
        // Outputs are still missing.
        assert!(!cache.should_skip(&scope, &sources(), &config, VERSION, &expected).unwrap());

        create_dir_all(&config.dest).unwrap();
        write(config.dest.join("icons.woff"), b"woff").unwrap();
        write(config.stylesheet_file(), b"css").unwrap();
        write(config.demo_file(), b"html").unwrap();
        assert!(cache.should_skip(&scope, &sources(), &config, VERSION, &expected).unwrap());

        let other = CacheScope::new("other");
        assert!(!cache.should_skip(&other, &sources(), &config, VERSION, &expected).unwrap());
    }

    #[test]
    fn test_embedded_fonts_not_expected() {
        let config = BuildConfig::new("out")
            .with_types([crate::FontFormat::Woff, crate::FontFormat::Ttf])
            .with_embed([crate::FontFormat::Woff]);
        let expected = ExpectedOutputs::for_config(&config);
        assert_eq!(expected.fonts.len(), 1);
        assert!(expected.fonts[0][0].ends_with("icons.ttf"));
    }
}
