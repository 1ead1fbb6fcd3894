//! Error types for font conversion.

use std::{io, path::PathBuf, result};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    ParseFont(#[from] read_fonts::ReadError),

    #[error("font has no '{0}' table")]
    MissingTable(&'static str),

    #[error("failed to compress table '{tag}': {source}")]
    Compress {
        tag: String,
        #[source]
        source: io::Error,
    },

    #[error("font too large for {format}: {size} bytes")]
    TooLarge { format: &'static str, size: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode WOFF2: {0}")]
    Woff2(String),

    #[error("ttfautohint not found in PATH, hinting skipped")]
    HintingUnavailable,

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    /// Whether the failure only means `ttfautohint` is missing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::HintingUnavailable)
    }
}

pub type Result<T> = result::Result<T, Error>;
