//! Shared value types: font formats, glyph sources, produced artifacts.

use std::{
    fmt,
    fs::read,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output font formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Svg,
    Ttf,
    Woff,
    Woff2,
    Eot,
}

impl FontFormat {
    pub const ALL: [FontFormat; 5] =
        [FontFormat::Svg, FontFormat::Ttf, FontFormat::Woff, FontFormat::Woff2, FontFormat::Eot];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            FontFormat::Svg => "svg",
            FontFormat::Ttf => "ttf",
            FontFormat::Woff => "woff",
            FontFormat::Woff2 => "woff2",
            FontFormat::Eot => "eot",
        }
    }

    /// The format this one is converted from, if it is not built from glyph sources.
    pub fn dependency(self) -> Option<FontFormat> {
        match self {
            FontFormat::Woff | FontFormat::Woff2 | FontFormat::Eot => Some(FontFormat::Ttf),
            FontFormat::Svg | FontFormat::Ttf => None,
        }
    }

    /// Whether the format is built straight from glyph sources.
    pub fn is_direct(self) -> bool {
        self.dependency().is_none()
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FontFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FontFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// One icon: a name and the vector source it is drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSource {
    pub name: String,
    pub source_path: PathBuf,
    pub bytes: Vec<u8>,
}

impl GlyphSource {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), source_path: source_path.into(), bytes }
    }

    /// Read a glyph source from disk.
    pub fn read(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        Ok(Self::new(name, path, bytes))
    }

    /// Source file extension, `svg` when the path has none.
    pub fn extension(&self) -> &str {
        self.source_path.extension().and_then(|s| s.to_str()).unwrap_or("svg")
    }
}

/// A produced font blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontArtifact {
    pub format: FontFormat,
    pub bytes: Arc<[u8]>,
    pub written_path: Option<PathBuf>,
}

impl FontArtifact {
    pub fn new(format: FontFormat, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { format, bytes: bytes.into(), written_path: None }
    }

    pub fn with_written_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.written_path = Some(path.into());
        self
    }
}
