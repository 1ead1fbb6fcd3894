//! Icon font generation backends.
//!
//! A backend turns an ordered set of named vector glyphs into font blobs.
//! Two implementations exist behind the [`Backend`] trait:
//!
//! - [`ExternalToolBackend`] drives an external generator over a JSON
//!   stdin/stdout handshake and returns every requested format at once.
//! - [`InProcessBackend`] builds the formats that come straight from glyph
//!   sources (`svg`, `ttf`); converted formats are left to the caller.

pub mod error;
pub mod external;
pub mod inprocess;
pub mod protocol;
pub mod types;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use external::{ExternalToolBackend, ExternalToolConfig};
pub use iconsmith_codepoints::Codepoints;
pub use inprocess::InProcessBackend;
pub use types::{FontArtifact, FontFormat, GlyphSource};

/// Available backend implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    ExternalTool,
    #[default]
    InProcess,
}

impl BackendKind {
    /// Instantiate the backend for this kind.
    pub fn create(self, external: &ExternalToolConfig) -> Box<dyn Backend> {
        match self {
            BackendKind::ExternalTool => Box::new(ExternalToolBackend::new(external.clone())),
            BackendKind::InProcess => Box::new(InProcessBackend::new()),
        }
    }
}

/// Flags forwarded to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    /// Append a content hash to the font name.
    pub add_hashes: bool,
    pub add_ligatures: bool,
    /// Run the TTF through the autohinter.
    pub autohint: bool,
    pub start_codepoint: u32,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            add_hashes: true,
            add_ligatures: false,
            autohint: true,
            start_codepoint: iconsmith_codepoints::UNICODE_PUA_START,
        }
    }
}

/// One font generation request.
#[derive(Debug, Clone)]
pub struct FontJob<'a> {
    pub sources: &'a [GlyphSource],
    pub codepoints: &'a Codepoints,
    pub formats: BTreeSet<FontFormat>,
    pub font_base_name: &'a str,
    pub options: JobOptions,
}

impl<'a> FontJob<'a> {
    pub fn new(
        sources: &'a [GlyphSource],
        codepoints: &'a Codepoints,
        font_base_name: &'a str,
    ) -> Self {
        Self {
            sources,
            codepoints,
            formats: BTreeSet::new(),
            font_base_name,
            options: JobOptions::default(),
        }
    }

    pub fn with_formats(mut self, formats: impl IntoIterator<Item = FontFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }

    pub fn with_options(mut self, options: JobOptions) -> Self {
        self.options = options;
        self
    }

    /// Codepoint of a glyph.
    pub fn codepoint(&self, name: &str) -> Result<u32> {
        self.codepoints.get(name).copied().ok_or_else(|| Error::MissingCodepoint(name.to_string()))
    }
}

/// What a backend hands back.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    /// Font file name without extension, hash suffix included.
    pub font_name: String,
    /// Final glyph names, in source order.
    pub glyph_names: Vec<String>,
    pub artifacts: Vec<FontArtifact>,
}

impl Generated {
    pub fn artifact(&self, format: FontFormat) -> Option<&FontArtifact> {
        self.artifacts.iter().find(|a| a.format == format)
    }

    pub fn formats(&self) -> BTreeSet<FontFormat> {
        self.artifacts.iter().map(|a| a.format).collect()
    }
}

/// A font generation backend.
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Produce font blobs for `job`.
    fn generate(&self, job: &FontJob<'_>) -> Result<Generated>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip_names() {
        let kind: BackendKind = serde_json::from_str("\"external-tool\"").unwrap();
        assert_eq!(kind, BackendKind::ExternalTool);
        assert_eq!(serde_json::to_string(&BackendKind::InProcess).unwrap(), "\"in-process\"");
    }

    #[test]
    fn test_create_matches_kind() {
        let config = ExternalToolConfig::default();
        assert_eq!(BackendKind::InProcess.create(&config).kind(), BackendKind::InProcess);
        assert_eq!(BackendKind::ExternalTool.create(&config).kind(), BackendKind::ExternalTool);
    }

    #[test]
    fn test_job_codepoint_lookup() {
        let mut codepoints = Codepoints::new();
        codepoints.insert("home".to_string(), 0xF101);
        let job = FontJob::new(&[], &codepoints, "icons");
        assert_eq!(job.codepoint("home").unwrap(), 0xF101);
        assert!(matches!(job.codepoint("nope"), Err(Error::MissingCodepoint(_))));
    }
}
