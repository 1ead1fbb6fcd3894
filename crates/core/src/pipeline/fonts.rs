use std::sync::Arc;

use iconsmith_backend::{
    BackendKind, Codepoints, FontArtifact, FontFormat, FontJob, Generated, GlyphSource, JobOptions,
};
use log::debug;

use crate::{
    config::BuildConfig,
    derive::{ArtifactTable, required_direct, write_artifacts},
    error::{Error, Result},
};

/// Fonts of one build as they landed on disk.
#[derive(Debug, Clone)]
pub struct WrittenFonts {
    /// File name without extension, hash suffix included.
    pub font_name: String,
    pub glyph_names: Vec<String>,
    pub artifacts: Vec<FontArtifact>,
}

pub(crate) fn job_options(config: &BuildConfig) -> JobOptions {
    JobOptions {
        add_hashes: config.add_hashes,
        add_ligatures: config.add_ligatures,
        autohint: config.autohint,
        start_codepoint: config.start_codepoint,
    }
}

/// Run the configured backend, derive what it did not produce, and write
/// every requested format to `config.dest`.
///
/// The external tool is asked for every requested format. The in-process
/// backend is asked only for the direct formats those depend on, so a TTF
/// is built once and only when something needs it.
pub fn generate_fonts(
    config: &BuildConfig,
    sources: &[GlyphSource],
    codepoints: &Codepoints,
) -> Result<WrittenFonts> {
    let backend = config.engine.create(&config.external_tool);
    let formats = match backend.kind() {
        BackendKind::ExternalTool => config.types.iter().copied().collect(),
        BackendKind::InProcess => required_direct(config.types.iter().copied()),
    };
    debug!("{:?} backend producing {formats:?}", backend.kind());

    let job = FontJob::new(sources, codepoints, &config.font_base_name)
        .with_formats(formats)
        .with_options(job_options(config));
    let Generated { font_name, glyph_names, artifacts } = backend.generate(&job)?;

    let table = ArtifactTable::seeded(artifacts);
    let missing = |format: FontFormat| -> Result<Arc<[u8]>> { Err(Error::MissingArtifact(format)) };
    let artifacts = write_artifacts(&config.types, &table, &missing, &config.dest, &font_name)?;

    Ok(WrittenFonts { font_name, glyph_names, artifacts })
}
