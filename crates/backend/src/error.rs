//! Error types for font generation backends.

use std::{io, path::PathBuf, result};

use write_fonts::BuilderError;

/// Errors that can occur while generating fonts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{tool} not found. Please install {tool} and all other requirements.")]
    ToolNotFound { tool: String },

    #[error("{tool} failed:\n{message}")]
    ToolFailed { tool: String, message: String },

    #[error("backend did not return a proper JSON result: {reason}\n{output}")]
    Protocol { reason: String, output: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown font format '{0}'")]
    UnknownFormat(String),

    #[error("failed to parse SVG glyph '{name}': {message}")]
    Svg { name: String, message: String },

    #[error("glyph '{0}' has no codepoint")]
    MissingCodepoint(String),

    #[error("codepoint U+{0:04X} is not a valid character")]
    InvalidCodepoint(u32),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to build glyph '{name}': {message}")]
    Glyph { name: String, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = result::Result<T, Error>;
