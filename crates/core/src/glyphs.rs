//! Loading glyph sources and naming them.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use iconsmith_backend::GlyphSource;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a source path becomes a glyph name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphNaming {
    /// File name without extension: `arrows/left.svg` is `left`.
    #[default]
    Basename,
    /// Path below the source root, separators as `-`: `arrows/left.svg` is `arrows-left`.
    Path,
}

impl GlyphNaming {
    pub fn name(self, path: &Path, root: &Path) -> String {
        match self {
            GlyphNaming::Basename => stem(path),
            GlyphNaming::Path => {
                let relative = path.strip_prefix(root).unwrap_or(path);
                let mut parts: Vec<String> = relative
                    .parent()
                    .into_iter()
                    .flat_map(|p| p.components())
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .filter(|c| c != "." && !c.is_empty())
                    .collect();
                parts.push(stem(path));
                parts.join("-")
            }
        }
    }
}

fn stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Read every source, naming each with `rename`.
///
/// Fails on an empty list and on two sources that end up with the same name.
pub fn load_sources(
    paths: &[PathBuf],
    rename: impl Fn(&Path) -> String,
) -> Result<Vec<GlyphSource>> {
    if paths.is_empty() {
        return Err(Error::EmptySourceSet);
    }

    let mut seen: HashMap<String, &Path> = HashMap::new();
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let name = rename(path);
        if let Some(first) = seen.insert(name.clone(), path) {
            return Err(Error::DuplicateGlyphName {
                name,
                first: first.to_path_buf(),
                second: path.clone(),
            });
        }
        sources.push(GlyphSource::read(name, path)?);
    }
    Ok(sources)
}

/// Glyph name as used in CSS class names.
pub fn css_name(name: &str) -> String {
    name.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_naming_strategies() {
        let root = Path::new("/icons");
        let path = Path::new("/icons/arrows/left.svg");
        assert_eq!(GlyphNaming::Basename.name(path, root), "left");
        assert_eq!(GlyphNaming::Path.name(path, root), "arrows-left");
        assert_eq!(GlyphNaming::Path.name(Path::new("/icons/home.svg"), root), "home");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let first = dir.path().join("a/home.svg");
        let second = dir.path().join("b/home.svg");
        write(&first, "<svg/>").unwrap();
        write(&second, "<svg/>").unwrap();

        let err = load_sources(&[first, second], |p| GlyphNaming::Basename.name(p, dir.path()))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateGlyphName { ref name, .. } if name == "home"));

        let ok = load_sources(
            &[dir.path().join("a/home.svg"), dir.path().join("b/home.svg")],
            |p| GlyphNaming::Path.name(p, dir.path()),
        )
        .unwrap();
        assert_eq!(ok[0].name, "a-home");
        assert_eq!(ok[1].name, "b-home");
    }

    #[test]
    fn test_empty_source_set() {
        assert!(matches!(load_sources(&[], |_| String::new()), Err(Error::EmptySourceSet)));
    }

    #[test]
    fn test_css_name() {
        assert_eq!(css_name("arrow left"), "arrow-left");
    }
}
