//! Build options and their defaulting into an immutable [`BuildConfig`].
//!
//! [`BuildOptions`] mirrors what a user writes: every field is optional and
//! lists may be given as `"a,b"` strings or arrays. [`BuildOptions::resolve`]
//! fills in defaults and validates values, producing the [`BuildConfig`] the
//! pipeline runs on and the cache fingerprints.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    str::FromStr,
};

use iconsmith_backend::{BackendKind, ExternalToolConfig, FontFormat};
use iconsmith_codepoints::{CodepointAllocator, MAX_CODEPOINT, UNICODE_PUA_START};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    glyphs::GlyphNaming,
};

pub const DEFAULT_FONT_NAME: &str = "icons";

pub const DEFAULT_TYPES: [FontFormat; 3] = [FontFormat::Eot, FontFormat::Woff, FontFormat::Ttf];

/// `@font-face` source order.
pub const DEFAULT_ORDER: [FontFormat; 5] =
    [FontFormat::Eot, FontFormat::Woff2, FontFormat::Woff, FontFormat::Ttf, FontFormat::Svg];

/// What `embed = true` means.
pub const DEFAULT_EMBED: [FontFormat; 1] = [FontFormat::Woff];

/// Stylesheet language of the generated file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylesheetFamily {
    #[default]
    Css,
    Scss,
    Sass,
    Less,
    Styl,
}

impl StylesheetFamily {
    pub fn extension(self) -> &'static str {
        match self {
            StylesheetFamily::Css => "css",
            StylesheetFamily::Scss => "scss",
            StylesheetFamily::Sass => "sass",
            StylesheetFamily::Less => "less",
            StylesheetFamily::Styl => "styl",
        }
    }

    /// File name prefix; partials for Sass start with `_`.
    pub fn file_prefix(self) -> &'static str {
        match self {
            StylesheetFamily::Sass | StylesheetFamily::Scss => "_",
            _ => "",
        }
    }

    /// Separator between `url(...)` entries of one `src` declaration.
    pub fn separator(self) -> &'static str {
        match self {
            StylesheetFamily::Styl => ", ",
            _ => ",\n\t\t",
        }
    }

    /// Whether block comments must become line comments.
    pub fn is_preprocessor(self) -> bool {
        self != StylesheetFamily::Css
    }
}

impl FromStr for StylesheetFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "css" => Ok(StylesheetFamily::Css),
            "scss" => Ok(StylesheetFamily::Scss),
            "sass" => Ok(StylesheetFamily::Sass),
            "less" => Ok(StylesheetFamily::Less),
            "styl" => Ok(StylesheetFamily::Styl),
            _ => Err(Error::InvalidOption { option: "stylesheet", value: s.to_string() }),
        }
    }
}

/// Class naming convention of the built-in templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSyntax {
    /// `.icon.icon_home`
    #[default]
    Bem,
    /// `.icon-home`
    Bootstrap,
}

impl TemplateSyntax {
    pub fn base_class(self) -> &'static str {
        match self {
            TemplateSyntax::Bem => "icon",
            TemplateSyntax::Bootstrap => "",
        }
    }

    pub fn class_prefix(self) -> &'static str {
        match self {
            TemplateSyntax::Bem => "icon_",
            TemplateSyntax::Bootstrap => "icon-",
        }
    }
}

/// Which parts of the stylesheet are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleGroups {
    /// `@font-face` rules.
    pub font: bool,
    /// Base icon class.
    pub icon: bool,
    /// Size and alignment helpers.
    pub extra: bool,
}

impl Default for StyleGroups {
    fn default() -> Self {
        Self { font: true, icon: true, extra: false }
    }
}

impl StyleGroups {
    fn parse(names: &[String]) -> Result<Self> {
        let mut groups = Self { font: false, icon: false, extra: false };
        for name in names {
            match name.as_str() {
                "font" => groups.font = true,
                "icon" => groups.icon = true,
                "extra" => groups.extra = true,
                _ => return Err(Error::InvalidOption { option: "styles", value: name.clone() }),
            }
        }
        Ok(groups)
    }
}

/// Effective, fully defaulted options of one build target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub font_base_name: String,
    /// Font output directory.
    pub dest: PathBuf,
    pub dest_css: PathBuf,
    pub dest_html: PathBuf,
    /// Requested formats, in declaration order.
    pub types: Vec<FontFormat>,
    /// `@font-face` source order.
    pub order: Vec<FontFormat>,
    pub embed: BTreeSet<FontFormat>,
    pub relative_font_path: Option<String>,
    pub stylesheet: StylesheetFamily,
    pub syntax: TemplateSyntax,
    pub template: Option<PathBuf>,
    pub demo_template: Option<PathBuf>,
    pub styles: StyleGroups,
    pub html_demo: bool,
    pub add_hashes: bool,
    pub autohint: bool,
    pub add_ligatures: bool,
    pub start_codepoint: u32,
    pub codepoints: BTreeMap<String, u32>,
    /// Fail when a glyph has no entry in `codepoints`.
    pub codepoints_complete: bool,
    pub naming: GlyphNaming,
    pub engine: BackendKind,
    pub external_tool: ExternalToolConfig,
}

impl BuildConfig {
    /// Defaults for a build writing everything to `dest`.
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        let dest = dest.into();
        Self {
            font_base_name: DEFAULT_FONT_NAME.to_string(),
            dest_css: dest.clone(),
            dest_html: dest.clone(),
            dest,
            types: DEFAULT_TYPES.to_vec(),
            order: DEFAULT_ORDER.to_vec(),
            embed: BTreeSet::new(),
            relative_font_path: None,
            stylesheet: StylesheetFamily::Css,
            syntax: TemplateSyntax::Bem,
            template: None,
            demo_template: None,
            styles: StyleGroups::default(),
            html_demo: true,
            add_hashes: true,
            autohint: true,
            add_ligatures: false,
            start_codepoint: UNICODE_PUA_START,
            codepoints: BTreeMap::new(),
            codepoints_complete: false,
            naming: GlyphNaming::default(),
            engine: BackendKind::default(),
            external_tool: ExternalToolConfig::default(),
        }
    }

    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_base_name = name.into();
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = FontFormat>) -> Self {
        self.types = dedup(types);
        self
    }

    pub fn with_embed(mut self, embed: impl IntoIterator<Item = FontFormat>) -> Self {
        self.embed = embed.into_iter().collect();
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: StylesheetFamily) -> Self {
        self.stylesheet = stylesheet;
        self.html_demo = self.html_demo && stylesheet == StylesheetFamily::Css;
        self
    }

    pub fn with_hashes(mut self, add_hashes: bool) -> Self {
        self.add_hashes = add_hashes;
        self
    }

    pub fn with_autohint(mut self, autohint: bool) -> Self {
        self.autohint = autohint;
        self
    }

    pub fn with_html_demo(mut self, html_demo: bool) -> Self {
        self.html_demo = html_demo && self.stylesheet == StylesheetFamily::Css;
        self
    }

    pub fn with_codepoints(mut self, codepoints: impl IntoIterator<Item = (String, u32)>) -> Self {
        self.codepoints = codepoints.into_iter().collect();
        self
    }

    pub fn requests(&self, format: FontFormat) -> bool {
        self.types.contains(&format)
    }

    /// Requested formats whose files are inlined instead of linked.
    pub fn embedded_formats(&self) -> BTreeSet<FontFormat> {
        self.types.iter().copied().filter(|f| self.embed.contains(f)).collect()
    }

    /// Stylesheet file name, e.g. `_icons.scss`.
    pub fn stylesheet_file(&self) -> PathBuf {
        self.dest_css.join(format!(
            "{}{}.{}",
            self.stylesheet.file_prefix(),
            self.font_base_name,
            self.stylesheet.extension()
        ))
    }

    pub fn demo_file(&self) -> PathBuf {
        self.dest_html.join(format!("{}.html", self.font_base_name))
    }
}

fn dedup(formats: impl IntoIterator<Item = FontFormat>) -> Vec<FontFormat> {
    let mut seen = BTreeSet::new();
    formats.into_iter().filter(|f| seen.insert(*f)).collect()
}

/// A list given either as `"a,b"` or as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListOption {
    Joined(String),
    Items(Vec<String>),
}

impl ListOption {
    pub fn items(&self) -> Vec<String> {
        match self {
            ListOption::Joined(s) => {
                s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
            }
            ListOption::Items(items) => items.iter().map(|s| s.trim().to_string()).collect(),
        }
    }

    fn formats(&self, option: &'static str) -> Result<Vec<FontFormat>> {
        self.items()
            .iter()
            .map(|s| {
                s.parse().map_err(|_| Error::InvalidOption { option, value: s.clone() })
            })
            .collect()
    }
}

/// `embed = true`, `embed = false` or an explicit format list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbedOption {
    Enabled(bool),
    Formats(ListOption),
}

impl EmbedOption {
    fn formats(&self) -> Result<Vec<FontFormat>> {
        match self {
            EmbedOption::Enabled(true) => Ok(DEFAULT_EMBED.to_vec()),
            EmbedOption::Enabled(false) => Ok(Vec::new()),
            EmbedOption::Formats(list) => list.formats("embed"),
        }
    }
}

/// User-facing options of one target. Unset fields take defaults on resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildOptions {
    pub font: Option<String>,
    pub dest: Option<PathBuf>,
    pub dest_css: Option<PathBuf>,
    pub dest_html: Option<PathBuf>,
    pub types: Option<ListOption>,
    pub order: Option<ListOption>,
    pub embed: Option<EmbedOption>,
    pub relative_font_path: Option<String>,
    pub stylesheet: Option<String>,
    pub syntax: Option<TemplateSyntax>,
    pub template: Option<PathBuf>,
    pub demo_template: Option<PathBuf>,
    pub styles: Option<ListOption>,
    pub html_demo: Option<bool>,
    pub hashes: Option<bool>,
    pub autohint: Option<bool>,
    pub ligatures: Option<bool>,
    pub start_codepoint: Option<u32>,
    pub codepoints: Option<IndexMap<String, u32>>,
    pub codepoints_complete: Option<bool>,
    pub rename: Option<GlyphNaming>,
    pub engine: Option<BackendKind>,
    pub external_tool: Option<ExternalToolConfig>,
}

impl BuildOptions {
    /// Fill unset fields from `defaults`. Codepoint maps are merged, with
    /// this target's entries taking precedence.
    pub fn or(self, defaults: &BuildOptions) -> BuildOptions {
        let codepoints = match (self.codepoints, &defaults.codepoints) {
            (Some(own), Some(base)) => {
                let mut merged = base.clone();
                merged.extend(own);
                Some(merged)
            }
            (own, base) => own.or_else(|| base.clone()),
        };

        BuildOptions {
            font: self.font.or_else(|| defaults.font.clone()),
            dest: self.dest.or_else(|| defaults.dest.clone()),
            dest_css: self.dest_css.or_else(|| defaults.dest_css.clone()),
            dest_html: self.dest_html.or_else(|| defaults.dest_html.clone()),
            types: self.types.or_else(|| defaults.types.clone()),
            order: self.order.or_else(|| defaults.order.clone()),
            embed: self.embed.or_else(|| defaults.embed.clone()),
            relative_font_path: self
                .relative_font_path
                .or_else(|| defaults.relative_font_path.clone()),
            stylesheet: self.stylesheet.or_else(|| defaults.stylesheet.clone()),
            syntax: self.syntax.or(defaults.syntax),
            template: self.template.or_else(|| defaults.template.clone()),
            demo_template: self.demo_template.or_else(|| defaults.demo_template.clone()),
            styles: self.styles.or_else(|| defaults.styles.clone()),
            html_demo: self.html_demo.or(defaults.html_demo),
            hashes: self.hashes.or(defaults.hashes),
            autohint: self.autohint.or(defaults.autohint),
            ligatures: self.ligatures.or(defaults.ligatures),
            start_codepoint: self.start_codepoint.or(defaults.start_codepoint),
            codepoints,
            codepoints_complete: self.codepoints_complete.or(defaults.codepoints_complete),
            rename: self.rename.or(defaults.rename),
            engine: self.engine.or(defaults.engine),
            external_tool: self.external_tool.or_else(|| defaults.external_tool.clone()),
        }
    }

    /// Apply defaults and validate. Relative paths are taken from `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> Result<BuildConfig> {
        let dest = base_dir.join(self.dest.as_ref().ok_or(Error::MissingOption("dest"))?);
        let dest_css = self.dest_css.as_ref().map_or_else(|| dest.clone(), |p| base_dir.join(p));
        let dest_html =
            self.dest_html.as_ref().map_or_else(|| dest_css.clone(), |p| base_dir.join(p));

        let stylesheet = match &self.stylesheet {
            Some(s) => s.parse()?,
            None => StylesheetFamily::default(),
        };

        let types = match &self.types {
            Some(list) => dedup(list.formats("types")?),
            None => DEFAULT_TYPES.to_vec(),
        };
        let order = match &self.order {
            Some(list) => dedup(list.formats("order")?),
            None => DEFAULT_ORDER.to_vec(),
        };
        let embed = match &self.embed {
            Some(embed) => embed.formats()?.into_iter().collect(),
            None => BTreeSet::new(),
        };
        let styles = match &self.styles {
            Some(list) => StyleGroups::parse(&list.items())?,
            None => StyleGroups::default(),
        };

        let font_base_name = self.font.clone().unwrap_or_else(|| DEFAULT_FONT_NAME.to_string());
        if font_base_name.is_empty() || font_base_name.contains(['/', '\\']) {
            return Err(Error::InvalidOption { option: "font", value: font_base_name });
        }

        let start_codepoint = self.start_codepoint.unwrap_or(UNICODE_PUA_START);
        if start_codepoint > MAX_CODEPOINT {
            return Err(Error::InvalidOption {
                option: "start_codepoint",
                value: format!("{start_codepoint:#X}"),
            });
        }
        let codepoints: BTreeMap<String, u32> = self
            .codepoints
            .as_ref()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        CodepointAllocator::new()
            .with_explicit(codepoints.iter().map(|(k, v)| (k.as_str(), *v)))
            .validate()?;

        Ok(BuildConfig {
            font_base_name,
            dest,
            dest_css,
            dest_html,
            types,
            order,
            embed,
            relative_font_path: self.relative_font_path.clone(),
            stylesheet,
            syntax: self.syntax.unwrap_or_default(),
            template: self.template.as_ref().map(|p| base_dir.join(p)),
            demo_template: self.demo_template.as_ref().map(|p| base_dir.join(p)),
            styles,
            html_demo: stylesheet == StylesheetFamily::Css && self.html_demo.unwrap_or(true),
            add_hashes: self.hashes.unwrap_or(true),
            autohint: self.autohint.unwrap_or(true),
            add_ligatures: self.ligatures.unwrap_or(false),
            start_codepoint,
            codepoints,
            codepoints_complete: self.codepoints_complete.unwrap_or(false),
            naming: self.rename.unwrap_or_default(),
            engine: self.engine.unwrap_or_default(),
            external_tool: self.external_tool.clone().unwrap_or_default(),
        })
    }
}
