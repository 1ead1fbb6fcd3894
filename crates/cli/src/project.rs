//! `iconsmith.toml` project files.
//!
//! ```toml
//! [defaults]
//! dest = "dist/fonts"
//! types = ["woff2", "woff"]
//!
//! [targets.icons]
//! src = "icons/*.svg"
//! dest_css = "dist/css"
//! ```
//!
//! Every target table takes the build options, plus `src` (one or more glob
//! patterns) and `root` (the directory `rename = "path"` names glyphs
//! relative to). Unset target values fall back to `[defaults]`.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use iconsmith_core::{BuildConfig, BuildOptions, Target, config::ListOption, load_sources};
use indexmap::IndexMap;
use serde::Deserialize;
use toml::{Table, Value};

use crate::io::{glob_sources, pattern_root};

pub const DEFAULT_PROJECT_FILE: &str = "iconsmith.toml";

/// Cache root used when none is given, next to the project file.
pub const DEFAULT_CACHE_DIR: &str = ".iconsmith-cache";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProjectFile {
    defaults: Table,
    targets: IndexMap<String, Table>,
}

/// Sources and options of one target table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetEntry {
    pub src: Option<Vec<String>>,
    pub root: Option<PathBuf>,
    pub options: BuildOptions,
}

impl TargetEntry {
    fn from_table(mut table: Table) -> Result<Self> {
        let src = table
            .remove("src")
            .map(|v| v.try_into::<ListOption>().map(|list| list.items()))
            .transpose()
            .context("Invalid 'src'")?;
        let root = table
            .remove("root")
            .map(Value::try_into::<PathBuf>)
            .transpose()
            .context("Invalid 'root'")?;
        let options = Value::Table(table).try_into()?;
        Ok(Self { src, root, options })
    }

    fn or(self, defaults: &TargetEntry) -> TargetEntry {
        TargetEntry {
            src: self.src.or_else(|| defaults.src.clone()),
            root: self.root.or_else(|| defaults.root.clone()),
            options: self.options.or(&defaults.options),
        }
    }
}

/// A parsed project file.
#[derive(Debug, Clone)]
pub struct Project {
    base_dir: PathBuf,
    defaults: TargetEntry,
    targets: IndexMap<String, TargetEntry>,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir)
            .with_context(|| format!("Invalid project file: {}", path.display()))
    }

    /// Parse project text; relative paths resolve against `base_dir`.
    pub fn parse(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let file: ProjectFile = toml::from_str(text)?;
        let defaults = TargetEntry::from_table(file.defaults).context("In [defaults]")?;
        let targets = file
            .targets
            .into_iter()
            .map(|(name, table)| {
                let entry = TargetEntry::from_table(table)
                    .with_context(|| format!("In [targets.{name}]"))?;
                Ok((name, entry))
            })
            .collect::<Result<IndexMap<_, _>>>()?;
        if targets.is_empty() {
            bail!("No targets defined");
        }
        Ok(Self { base_dir: base_dir.into(), defaults, targets })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// `names`, or every target when empty. Unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Ok(self.target_names().map(String::from).collect());
        }
        for name in names {
            if !self.targets.contains_key(name) {
                bail!(
                    "Unknown target '{name}' (available: {})",
                    self.target_names().collect::<Vec<_>>().join(", ")
                );
            }
        }
        Ok(names.to_vec())
    }

    /// Target options merged over the defaults.
    pub fn entry(&self, name: &str) -> Result<TargetEntry> {
        let entry = self.targets.get(name).with_context(|| format!("Unknown target '{name}'"))?;
        Ok(entry.clone().or(&self.defaults))
    }

    pub fn config(&self, name: &str) -> Result<BuildConfig> {
        let config = self
            .entry(name)?
            .options
            .resolve(&self.base_dir)
            .with_context(|| format!("Invalid options for target '{name}'"))?;
        Ok(config)
    }

    /// Resolve options and read every glyph source of `name`.
    pub fn target(&self, name: &str) -> Result<Target> {
        let entry = self.entry(name)?;
        let config = entry
            .options
            .resolve(&self.base_dir)
            .with_context(|| format!("Invalid options for target '{name}'"))?;

        let Some(patterns) = entry.src.filter(|p| !p.is_empty()) else {
            bail!("Target '{name}' has no 'src' patterns");
        };
        let paths = glob_sources(&self.base_dir, &patterns)?;
        let root = match &entry.root {
            Some(root) => self.base_dir.join(root),
            None => pattern_root(&self.base_dir, &patterns[0]),
        };
        let naming = config.naming;
        let sources = load_sources(&paths, |path| naming.name(path, &root))
            .with_context(|| format!("Failed to load glyphs of target '{name}'"))?;

        Ok(Target::new(name, sources, config))
    }
}

#[cfg(test)]
mod tests {
    use iconsmith_core::{FontFormat, GlyphNaming, StylesheetFamily};

    use super::*;

    const PROJECT: &str = r#"
[defaults]
dest = "dist/fonts"
src = "icons/*.svg"
types = "woff,ttf"
hashes = false

[defaults.codepoints]
home = 0xF200

[targets.icons]
dest_css = "dist/css"

[targets.admin]
src = ["admin/**/*.svg"]
rename = "path"
stylesheet = "scss"
embed = true

[targets.admin.codepoints]
gear = 0xE000
"#;

    #[test]
    fn test_targets_inherit_defaults() {
        let project = Project::parse(PROJECT, "/project").unwrap();
        assert_eq!(project.target_names().collect::<Vec<_>>(), ["icons", "admin"]);

        let icons = project.config("icons").unwrap();
        assert_eq!(icons.dest, Path::new("/project/dist/fonts"));
        assert_eq!(icons.dest_css, Path::new("/project/dist/css"));
        assert_eq!(icons.types, vec![FontFormat::Woff, FontFormat::Ttf]);
        assert!(!icons.add_hashes);
        assert_eq!(icons.codepoints.get("home"), Some(&0xF200));

        let admin = project.config("admin").unwrap();
        assert_eq!(admin.naming, GlyphNaming::Path);
        assert_eq!(admin.stylesheet, StylesheetFamily::Scss);
        assert!(admin.embed.contains(&FontFormat::Woff));
        assert_eq!(admin.codepoints.len(), 2);
        assert_eq!(project.entry("admin").unwrap().src.unwrap(), ["admin/**/*.svg"]);
        assert_eq!(project.entry("icons").unwrap().src.unwrap(), ["icons/*.svg"]);
    }

    #[test]
    fn test_select() {
        let project = Project::parse(PROJECT, "/project").unwrap();
        assert_eq!(project.select(&[]).unwrap(), ["icons", "admin"]);
        assert_eq!(project.select(&["admin".into()]).unwrap(), ["admin"]);
        assert!(project.select(&["nope".into()]).is_err());
    }

    #[test]
    fn test_unknown_option_rejected() {
        let text = "[targets.icons]\ndest = \"out\"\nfontname = \"x\"\n";
        assert!(Project::parse(text, ".").is_err());
    }

    #[test]
    fn test_no_targets() {
        assert!(Project::parse("[defaults]\ndest = \"out\"\n", ".").is_err());
    }
}
