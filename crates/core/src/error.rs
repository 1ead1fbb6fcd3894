//! Error types for the build pipeline.

use std::{io, path::PathBuf, result};

use iconsmith_backend::FontFormat;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Backend(#[from] iconsmith_backend::Error),

    #[error(transparent)]
    Codepoints(#[from] iconsmith_codepoints::Error),

    #[error("failed to convert font: {0}")]
    Convert(#[from] iconsmith_font_convert::Error),

    #[error("no glyph sources given")]
    EmptySourceSet,

    #[error("duplicate glyph name '{name}' ({first} and {second})")]
    DuplicateGlyphName { name: String, first: PathBuf, second: PathBuf },

    #[error("missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption { option: &'static str, value: String },

    #[error("{0} was requested but never produced")]
    MissingArtifact(FontFormat),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("template {name}: {message}")]
    Template { name: String, message: String },

    #[error("failed to serialize build config: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn template(name: impl Into<String>, message: impl ToString) -> Self {
        Error::Template { name: name.into(), message: message.to_string() }
    }
}

pub type Result<T> = result::Result<T, Error>;
