//! Memoized derivation of font formats.
//!
//! `woff`, `woff2` and `eot` are converted from `ttf`; `ttf` and `svg` come
//! straight from the backend. [`derive`] walks that graph through an
//! [`ArtifactTable`], which holds one slot per format so every format is
//! produced at most once even when several writers ask for it concurrently.

use std::{
    collections::BTreeSet,
    fs::write,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

use iconsmith_backend::{FontArtifact, FontFormat};
use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};

type Slot = Mutex<Option<Arc<[u8]>>>;

/// Produced bytes per format for one build.
#[derive(Debug, Default)]
pub struct ArtifactTable {
    slots: [Slot; FontFormat::ALL.len()],
}

impl ArtifactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table already holding `artifacts`.
    pub fn seeded(artifacts: impl IntoIterator<Item = FontArtifact>) -> Self {
        let table = Self::new();
        for artifact in artifacts {
            *lock(table.slot(artifact.format)) = Some(artifact.bytes);
        }
        table
    }

    pub fn get(&self, format: FontFormat) -> Option<Arc<[u8]>> {
        lock(self.slot(format)).clone()
    }

    fn slot(&self, format: FontFormat) -> &Slot {
        let index = FontFormat::ALL.iter().position(|f| *f == format).unwrap_or_default();
        &self.slots[index]
    }
}

fn lock(slot: &Slot) -> std::sync::MutexGuard<'_, Option<Arc<[u8]>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Direct formats a request depends on.
pub fn required_direct(requested: impl IntoIterator<Item = FontFormat>) -> BTreeSet<FontFormat> {
    requested.into_iter().map(|f| f.dependency().unwrap_or(f)).collect()
}

/// Convert a TTF into one of its dependents.
pub fn convert(format: FontFormat, ttf: &[u8]) -> Result<Vec<u8>> {
    let bytes = match format {
        FontFormat::Woff => iconsmith_font_convert::ttf_to_woff(ttf)?,
        FontFormat::Woff2 => iconsmith_font_convert::ttf_to_woff2(ttf)?,
        FontFormat::Eot => iconsmith_font_convert::ttf_to_eot(ttf)?,
        FontFormat::Svg | FontFormat::Ttf => return Err(Error::MissingArtifact(format)),
    };
    Ok(bytes)
}

/// Fetch `format`, producing it and its dependencies on first use.
///
/// The slot stays locked while the format is produced; dependencies are
/// always direct formats, so locks are taken in one order only.
pub fn derive<F>(format: FontFormat, table: &ArtifactTable, produce_direct: &F) -> Result<Arc<[u8]>>
where
    F: Fn(FontFormat) -> Result<Arc<[u8]>> + Sync,
{
    let mut slot = lock(table.slot(format));
    if let Some(bytes) = slot.as_ref() {
        return Ok(bytes.clone());
    }

    let bytes: Arc<[u8]> = match format.dependency() {
        Some(dependency) => {
            let source = derive(dependency, table, produce_direct)?;
            debug!("Converting {dependency} to {format}");
            convert(format, &source)?.into()
        }
        None => produce_direct(format)?,
    };
    *slot = Some(bytes.clone());
    Ok(bytes)
}

/// Derive every requested format in parallel and write `{dest}/{font_name}.{ext}`.
///
/// Unrequested intermediates stay in memory.
pub fn write_artifacts<F>(
    requested: &[FontFormat],
    table: &ArtifactTable,
    produce_direct: &F,
    dest: &Path,
    font_name: &str,
) -> Result<Vec<FontArtifact>>
where
    F: Fn(FontFormat) -> Result<Arc<[u8]>> + Sync,
{
    requested
        .par_iter()
        .map(|&format| {
            let bytes = derive(format, table, produce_direct)?;
            let path = dest.join(format!("{font_name}.{}", format.extension()));
            write(&path, &bytes).map_err(|e| Error::io(&path, e))?;
            Ok(FontArtifact::new(format, bytes).with_written_path(path))
        })
        .collect()
}
