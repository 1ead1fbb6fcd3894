//! Backend that builds fonts without leaving the process.
//!
//! Glyph sources are parsed as SVG, scaled into a 512-unit em square and
//! written out as an SVG font and a TrueType font. Only those two formats
//! are produced here; `woff`, `woff2` and `eot` are derived from the TTF by
//! the caller.

mod outline;
mod svg_font;
mod truetype;

use log::{debug, warn};
use sha2::{Digest, Sha256};

pub use outline::{ASCENT, DESCENT, GlyphOutline, UNITS_PER_EM};
pub use svg_font::build_svg_font;
pub use truetype::build_truetype;

use crate::{
    Backend, BackendKind, FontJob, Generated,
    error::Result,
    types::{FontArtifact, FontFormat},
};

/// Hex digits of the content hash appended to font names.
const HASH_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessBackend;

impl InProcessBackend {
    pub fn new() -> Self {
        Self
    }

    fn outlines(&self, job: &FontJob<'_>) -> Result<Vec<GlyphOutline>> {
        job.sources
            .iter()
            .map(|glyph| GlyphOutline::from_svg(glyph, job.codepoint(&glyph.name)?))
            .collect()
    }

    fn truetype(&self, font_name: &str, outlines: &[GlyphOutline], autohint: bool) -> Result<Vec<u8>> {
        let ttf = build_truetype(font_name, outlines)?;
        if !autohint {
            return Ok(ttf);
        }

        match iconsmith_font_convert::autohint(&ttf) {
            Ok(hinted) => Ok(hinted),
            Err(e) if e.is_unavailable() => {
                debug!("{e}; keeping unhinted TTF");
                Ok(ttf)
            }
            Err(e) => {
                warn!("Autohinting failed, keeping unhinted TTF: {e}");
                Ok(ttf)
            }
        }
    }
}

/// Content hash of a rendered SVG font, truncated for use in file names.
pub fn content_hash(svg_font: &str) -> String {
    let digest = hex::encode(Sha256::digest(svg_font.as_bytes()));
    digest[..HASH_LEN].to_string()
}

impl Backend for InProcessBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::InProcess
    }

    fn generate(&self, job: &FontJob<'_>) -> Result<Generated> {
        if job.options.add_ligatures {
            warn!("Ligatures are not supported by the in-process backend; ignoring");
        }

        let outlines = self.outlines(job)?;
        // The SVG font id stays the base name so `.svg#{base}` references hold.
        let svg = build_svg_font(job.font_base_name, &outlines);

        let font_name = if job.options.add_hashes {
            format!("{}-{}", job.font_base_name, content_hash(&svg))
        } else {
            job.font_base_name.to_string()
        };

        let mut artifacts = Vec::new();
        for &format in &job.formats {
            match format {
                FontFormat::Svg => {
                    artifacts.push(FontArtifact::new(format, svg.clone().into_bytes()));
                }
                FontFormat::Ttf => {
                    let ttf = self.truetype(job.font_base_name, &outlines, job.options.autohint)?;
                    artifacts.push(FontArtifact::new(format, ttf));
                }
                other => debug!("In-process backend leaves {other} to the converters"),
            }
        }

        Ok(Generated {
            font_name,
            glyph_names: job.sources.iter().map(|g| g.name.clone()).collect(),
            artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use iconsmith_codepoints::Codepoints;

    use super::*;
    use crate::{JobOptions, types::GlyphSource};

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><path d="M2 2H14V14H2Z"/></svg>"#;

    fn sources() -> (Vec<GlyphSource>, Codepoints) {
        let sources = vec![GlyphSource::new("home", "home.svg", SQUARE.as_bytes().to_vec())];
        let mut codepoints = Codepoints::new();
        codepoints.insert("home".to_string(), 0xF101);
        (sources, codepoints)
    }

    fn options(add_hashes: bool) -> JobOptions {
        JobOptions { add_hashes, autohint: false, ..JobOptions::default() }
    }

    #[test]
    fn test_only_requested_direct_formats() {
        let (sources, codepoints) = sources();
        let job = FontJob::new(&sources, &codepoints, "icons")
            .with_formats([FontFormat::Svg, FontFormat::Woff])
            .with_options(options(false));
        let generated = InProcessBackend::new().generate(&job).unwrap();
        assert_eq!(generated.font_name, "icons");
        assert_eq!(generated.formats().into_iter().collect::<Vec<_>>(), vec![FontFormat::Svg]);
        assert_eq!(generated.glyph_names, vec!["home"]);
    }

    #[test]
    fn test_hash_suffix_is_stable() {
        let (sources, codepoints) = sources();
        let job = FontJob::new(&sources, &codepoints, "icons")
            .with_formats([FontFormat::Ttf])
            .with_options(options(true));
        let first = InProcessBackend::new().generate(&job).unwrap();
        let second = InProcessBackend::new().generate(&job).unwrap();
        assert!(first.font_name.starts_with("icons-"));
        assert_eq!(first.font_name.len(), "icons-".len() + HASH_LEN);
        assert_eq!(first.font_name, second.font_name);
        assert_eq!(
            first.artifact(FontFormat::Ttf).unwrap().bytes,
            second.artifact(FontFormat::Ttf).unwrap().bytes
        );
    }

    #[test]
    fn test_missing_codepoint() {
        let (sources, _) = sources();
        let empty = Codepoints::new();
        let job = FontJob::new(&sources, &empty, "icons").with_formats([FontFormat::Svg]);
        assert!(InProcessBackend::new().generate(&job).is_err());
    }
}
