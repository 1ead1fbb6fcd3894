//! `@font-face` source synthesis.
//!
//! Every format maps to at most two references: a primary one, a bare URL
//! for the legacy single-`src` declaration, and a secondary one that joins
//! the multi-URL `src` list. Embeddable formats can be inlined as `data:`
//! URLs; the font file is removed once it has been read.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{read, remove_file},
    path::Path,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use iconsmith_backend::FontFormat;
use log::debug;

use crate::error::{Error, Result};

/// How one format appears in a `src` list.
struct SourceRule {
    /// Appended to `{path}{font}`; `{base}` is replaced by the base name.
    suffix: &'static str,
    css_format: Option<&'static str>,
    embeddable: bool,
}

struct FormatRules {
    format: FontFormat,
    primary: Option<SourceRule>,
    secondary: Option<SourceRule>,
}

const RULES: &[FormatRules] = &[
    FormatRules {
        format: FontFormat::Eot,
        primary: Some(SourceRule { suffix: ".eot", css_format: None, embeddable: false }),
        secondary: Some(SourceRule {
            suffix: ".eot?#iefix",
            css_format: Some("embedded-opentype"),
            embeddable: false,
        }),
    },
    FormatRules {
        format: FontFormat::Woff2,
        primary: None,
        secondary: Some(SourceRule { suffix: ".woff2", css_format: Some("woff2"), embeddable: true }),
    },
    FormatRules {
        format: FontFormat::Woff,
        primary: None,
        secondary: Some(SourceRule { suffix: ".woff", css_format: Some("woff"), embeddable: true }),
    },
    FormatRules {
        format: FontFormat::Ttf,
        primary: None,
        secondary: Some(SourceRule {
            suffix: ".ttf",
            css_format: Some("truetype"),
            embeddable: true,
        }),
    },
    FormatRules {
        format: FontFormat::Svg,
        primary: None,
        secondary: Some(SourceRule {
            suffix: ".svg?#{base}",
            css_format: Some("svg"),
            embeddable: false,
        }),
    },
];

fn rules(format: FontFormat) -> Option<&'static FormatRules> {
    RULES.iter().find(|r| r.format == format)
}

/// Whether `format` can be inlined as a `data:` URL.
pub fn is_embeddable(format: FontFormat) -> bool {
    rules(format).and_then(|r| r.secondary.as_ref()).is_some_and(|s| s.embeddable)
}

/// One `url(...)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontReference {
    pub format: FontFormat,
    pub url: String,
    pub css_format: Option<&'static str>,
}

impl FontReference {
    pub fn is_embedded(&self) -> bool {
        self.url.starts_with("data:")
    }

    pub fn to_css(&self) -> String {
        let url = if self.is_embedded() {
            format!("url({})", self.url)
        } else {
            format!("url(\"{}\")", self.url)
        };
        match self.css_format {
            Some(format) => format!("{url} format(\"{format}\")"),
            None => url,
        }
    }
}

/// References split into the legacy and the multi-URL group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontSources {
    pub primary: Vec<FontReference>,
    pub secondary: Vec<FontReference>,
}

impl FontSources {
    /// Display strings of both groups.
    pub fn join(&self, separator: &str) -> (String, String) {
        let join = |refs: &[FontReference]| {
            refs.iter().map(FontReference::to_css).collect::<Vec<_>>().join(separator)
        };
        (join(&self.primary), join(&self.secondary))
    }
}

/// Inlined font payloads, read once and shared by stylesheet and demo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedFonts {
    /// Formats the configuration asked to embed.
    pub formats: BTreeSet<FontFormat>,
    payloads: BTreeMap<FontFormat, String>,
}

impl EmbeddedFonts {
    /// Read and delete `{dest}/{font_name}.{ext}` for every embeddable
    /// format in both `embed` and `requested`.
    pub fn take(
        dest: &Path,
        font_name: &str,
        embed: &BTreeSet<FontFormat>,
        requested: &[FontFormat],
    ) -> Result<Self> {
        let mut payloads = BTreeMap::new();
        for &format in requested.iter().filter(|f| embed.contains(*f) && is_embeddable(**f)) {
            let path = dest.join(format!("{font_name}.{}", format.extension()));
            let bytes = read(&path).map_err(|e| Error::io(&path, e))?;
            remove_file(&path).map_err(|e| Error::io(&path, e))?;
            debug!("Embedded {} ({} bytes)", path.display(), bytes.len());
            payloads.insert(format, STANDARD.encode(bytes));
        }
        Ok(Self { formats: embed.clone(), payloads })
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn data_uri(&self, format: FontFormat) -> Option<String> {
        self.payloads.get(&format).map(|b64| {
            format!("data:application/x-font-{};charset=utf-8;base64,{b64}", format.extension())
        })
    }
}

/// Build the references for `requested`, in `order`.
///
/// Formats outside the request or without rules are skipped. `relative_font_path`
/// is prepended verbatim, so it must be empty or end with `/`.
pub fn synthesize(
    requested: &[FontFormat],
    order: &[FontFormat],
    embedded: &EmbeddedFonts,
    font_name: &str,
    base_name: &str,
    relative_font_path: &str,
) -> FontSources {
    let mut sources = FontSources::default();
    let url = |rule: &SourceRule| {
        format!("{relative_font_path}{font_name}{}", rule.suffix.replace("{base}", base_name))
    };

    for &format in order.iter().filter(|f| requested.contains(*f)) {
        let Some(rules) = rules(format) else {
            continue;
        };

        if let Some(rule) = &rules.primary {
            sources.primary.push(FontReference { format, url: url(rule), css_format: rule.css_format });
        }

        let Some(rule) = &rules.secondary else {
            continue;
        };
        if format == FontFormat::Eot && embedded.formats.contains(&FontFormat::Eot) {
            continue;
        }
        let data_uri = rule.embeddable.then(|| embedded.data_uri(format)).flatten();
        sources.secondary.push(FontReference {
            format,
            url: data_uri.unwrap_or_else(|| url(rule)),
            css_format: rule.css_format,
        });
    }
    sources
}

/// Path from `from_dir` to `font_dir` as used in URLs, or `override_path`.
///
/// A non-empty result always ends with `/`.
pub fn relative_font_path(override_path: Option<&str>, from_dir: &Path, font_dir: &Path) -> String {
    let mut path = match override_path {
        Some(path) => path.to_string(),
        None => pathdiff::diff_paths(font_dir, from_dir)
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| font_dir.to_string_lossy().replace('\\', "/")),
    };
    if !path.is_empty() && !path.ends_with('/') {
        path.push('/');
    }
    path
}
