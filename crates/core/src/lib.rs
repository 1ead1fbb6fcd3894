//! Iconsmith Core - icon font build pipeline.
//!
//! Turns a set of SVG glyphs into font files, a stylesheet and an optional
//! demo page. Builds are fingerprinted so unchanged targets are skipped.

pub mod cache;
pub mod config;
pub mod derive;
pub mod error;
pub mod glyphs;
pub mod pipeline;
pub mod references;
pub mod render;

pub use cache::{BuildCache, CacheScope, ExpectedOutputs, PLUGIN_NAME};
pub use config::{BuildConfig, BuildOptions, StyleGroups, StylesheetFamily, TemplateSyntax};
pub use error::{Error, Result};
pub use glyphs::{GlyphNaming, load_sources};
pub use iconsmith_backend::{BackendKind, ExternalToolConfig, FontFormat, GlyphSource};
pub use pipeline::{BuildOutcome, BuildSummary, TOOL_VERSION, Target, build, clean};
