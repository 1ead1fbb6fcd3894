use std::{
    fs::write,
    path::{Path, PathBuf},
};

use iconsmith_backend::Codepoints;
use log::debug;

use crate::{
    config::BuildConfig,
    error::{Error, Result},
    references::{EmbeddedFonts, relative_font_path, synthesize},
    render::{GlyphEntry, Renderer, StyleContext, demo_template, line_comments, stylesheet_template},
};

/// Template-facing glyph list, in glyph order.
pub fn glyph_entries(glyph_names: &[String], codepoints: &Codepoints) -> Result<Vec<GlyphEntry>> {
    glyph_names
        .iter()
        .map(|name| -> Result<GlyphEntry> {
            let codepoint = codepoints
                .get(name)
                .copied()
                .ok_or_else(|| iconsmith_codepoints::Error::MissingCodepoint(name.clone()))?;
            Ok(GlyphEntry::new(name, codepoint))
        })
        .collect()
}

/// Writes the stylesheet and, when enabled, the demo page.
pub struct StyleWriter<'a> {
    config: &'a BuildConfig,
    font_name: &'a str,
    glyphs: Vec<GlyphEntry>,
    embedded: EmbeddedFonts,
    renderer: Renderer,
}

impl<'a> StyleWriter<'a> {
    /// Inlines embedded fonts first; their files are gone afterwards.
    pub fn new(config: &'a BuildConfig, font_name: &'a str, glyphs: Vec<GlyphEntry>) -> Result<Self> {
        let embedded = if config.embed.is_empty() {
            EmbeddedFonts::default()
        } else {
            EmbeddedFonts::take(&config.dest, font_name, &config.embed, &config.types)?
        };
        Ok(Self { config, font_name, glyphs, embedded, renderer: Renderer::new() })
    }

    pub fn embedded(&self) -> &EmbeddedFonts {
        &self.embedded
    }

    /// Context with font URLs relative to `from_dir`.
    fn context(&self, from_dir: &Path) -> StyleContext {
        let relative = relative_font_path(
            self.config.relative_font_path.as_deref(),
            from_dir,
            &self.config.dest,
        );
        let sources = synthesize(
            &self.config.types,
            &self.config.order,
            &self.embedded,
            self.font_name,
            &self.config.font_base_name,
            &relative,
        );
        StyleContext::new(self.config, self.font_name, &relative, &sources, self.glyphs.clone())
    }

    fn render_styles(&self, context: &StyleContext) -> Result<String> {
        let template = stylesheet_template(self.config.template.as_deref(), self.config.syntax)?;
        let css = self.renderer.render("stylesheet", &template, context)?;
        if self.config.stylesheet.is_preprocessor() {
            line_comments(&css)
        } else {
            Ok(css)
        }
    }

    pub fn write_stylesheet(&self) -> Result<PathBuf> {
        let context = self.context(&self.config.dest_css);
        let css = self.render_styles(&context)?;
        let path = self.config.stylesheet_file();
        write(&path, css).map_err(|e| Error::io(&path, e))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Demo page with its styles inlined; URLs are relative to the page.
    pub fn write_demo(&self) -> Result<PathBuf> {
        let mut context = self.context(&self.config.dest_html).for_demo();
        context.styles = Some(self.render_styles(&context)?);

        let template = demo_template(self.config.demo_template.as_deref())?;
        let html = self.renderer.render("demo", &template, &context)?;
        let path = self.config.demo_file();
        write(&path, html).map_err(|e| Error::io(&path, e))?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
