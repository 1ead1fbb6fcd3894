//! Stylesheet and demo page rendering.

use std::{fs::read_to_string, path::Path};

use handlebars::{Handlebars, no_escape};
use regex::Regex;
use serde::Serialize;

use crate::{
    config::{BuildConfig, StyleGroups, TemplateSyntax},
    error::{Error, Result},
    glyphs::css_name,
    references::FontSources,
};

const BEM_TEMPLATE: &str = include_str!("../templates/bem.css.hbs");
const BOOTSTRAP_TEMPLATE: &str = include_str!("../templates/bootstrap.css.hbs");
const DEMO_TEMPLATE: &str = include_str!("../templates/demo.html.hbs");

/// A glyph as templates see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphEntry {
    pub name: String,
    /// Lowercase hex, e.g. `f101`.
    pub codepoint: String,
    /// CSS `content` escape, e.g. `\f101`.
    pub css_content: String,
}

impl GlyphEntry {
    pub fn new(name: &str, codepoint: u32) -> Self {
        let hex = format!("{codepoint:x}");
        Self { name: css_name(name), css_content: format!("\\{hex}"), codepoint: hex }
    }
}

/// Values available to stylesheet and demo templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleContext {
    pub font_base_name: String,
    pub font_name: String,
    pub relative_font_path: String,
    pub font_src1: String,
    pub font_src2: String,
    /// Legacy `src` goes into its own `@font-face`, used when embedding.
    pub separate_legacy_face: bool,
    /// Legacy `src` precedes the full list inside one `@font-face`.
    pub inline_legacy: bool,
    pub embed: bool,
    pub eot: bool,
    pub fontface_styles: bool,
    pub base_styles: bool,
    pub extra_styles: bool,
    pub icons_styles: bool,
    pub stylesheet: &'static str,
    pub base_class: &'static str,
    pub class_prefix: &'static str,
    pub glyphs: Vec<GlyphEntry>,
    /// Inline CSS of the demo page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
}

impl StyleContext {
    /// Context for the stylesheet file.
    pub fn new(
        config: &BuildConfig,
        font_name: &str,
        relative_font_path: &str,
        sources: &FontSources,
        glyphs: Vec<GlyphEntry>,
    ) -> Self {
        let (font_src1, font_src2) = sources.join(config.stylesheet.separator());
        let embed = sources.secondary.iter().any(|r| r.is_embedded());
        let has_legacy = !font_src1.is_empty();

        Self {
            font_base_name: config.font_base_name.clone(),
            font_name: font_name.to_string(),
            relative_font_path: relative_font_path.to_string(),
            font_src1,
            font_src2,
            separate_legacy_face: has_legacy && embed,
            inline_legacy: has_legacy && !embed,
            embed,
            eot: config.requests(iconsmith_backend::FontFormat::Eot),
            fontface_styles: config.styles.font,
            base_styles: config.styles.icon,
            extra_styles: config.styles.extra,
            icons_styles: true,
            stylesheet: config.stylesheet.extension(),
            base_class: config.syntax.base_class(),
            class_prefix: config.syntax.class_prefix(),
            glyphs,
            styles: None,
        }
    }

    /// The same context for the demo page: every group needed to show the
    /// icons is switched on, helpers are off.
    pub fn for_demo(mut self) -> Self {
        let groups = StyleGroups { font: true, icon: true, extra: false };
        self.fontface_styles = groups.font;
        self.base_styles = groups.icon;
        self.extra_styles = groups.extra;
        self.icons_styles = true;
        self
    }
}

/// Handlebars with HTML escaping off; output is CSS and trusted markup.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        Self { registry }
    }

    pub fn render(&self, name: &str, template: &str, context: &impl Serialize) -> Result<String> {
        self.registry.render_template(template, context).map_err(|e| Error::template(name, e))
    }
}

/// Stylesheet template: the configured file or the one built in for `syntax`.
pub fn stylesheet_template(custom: Option<&Path>, syntax: TemplateSyntax) -> Result<String> {
    match custom {
        Some(path) => read_to_string(path).map_err(|e| Error::io(path, e)),
        None => Ok(match syntax {
            TemplateSyntax::Bem => BEM_TEMPLATE,
            TemplateSyntax::Bootstrap => BOOTSTRAP_TEMPLATE,
        }
        .to_string()),
    }
}

pub fn demo_template(custom: Option<&Path>) -> Result<String> {
    match custom {
        Some(path) => read_to_string(path).map_err(|e| Error::io(path, e)),
        None => Ok(DEMO_TEMPLATE.to_string()),
    }
}

/// Turn `/* text */` into `// text`; preprocessors drop line comments on compile.
pub fn line_comments(css: &str) -> Result<String> {
    let block = Regex::new(r"/\* *(.*?) *\*/").map_err(|e| Error::template("comments", e))?;
    Ok(block.replace_all(css, "// $1").into_owned())
}

#[cfg(test)]
mod tests {
    use iconsmith_backend::FontFormat;

    use super::*;
    use crate::references::{EmbeddedFonts, synthesize};

    fn context(config: &BuildConfig) -> StyleContext {
        let sources = synthesize(
            &config.types,
            &config.order,
            &EmbeddedFonts::default(),
            "icons-abc",
            "icons",
            "",
        );
        let glyphs = vec![GlyphEntry::new("home", 0xF101), GlyphEntry::new("arrow left", 0xF102)];
        StyleContext::new(config, "icons-abc", "", &sources, glyphs)
    }

    #[test]
    fn test_glyph_entry() {
        let glyph = GlyphEntry::new("arrow left", 0xF10A);
        assert_eq!(glyph.name, "arrow-left");
        assert_eq!(glyph.codepoint, "f10a");
        assert_eq!(glyph.css_content, "\\f10a");
    }

    #[test]
    fn test_bem_stylesheet() {
        let config = BuildConfig::new("out");
        let template = stylesheet_template(None, TemplateSyntax::Bem).unwrap();
        let css = Renderer::new().render("bem", &template, &context(&config)).unwrap();

        assert_eq!(css.matches("@font-face").count(), 1);
        assert!(css.contains("src:url(\"icons-abc.eot\");"));
        assert!(css.contains("url(\"icons-abc.woff\") format(\"woff\")"));
        assert!(css.contains(".icon_home:before"));
        assert!(css.contains(".icon_arrow-left:before"));
        assert!(css.contains("content:\"\\f101\";"));
        // No HTML escaping of quotes.
        assert!(!css.contains("&quot;"));
    }

    #[test]
    fn test_bootstrap_stylesheet() {
        let mut config = BuildConfig::new("out").with_types([FontFormat::Woff]);
        config.syntax = TemplateSyntax::Bootstrap;
        let template = stylesheet_template(None, config.syntax).unwrap();
        let ctx = context(&config);
        assert_eq!(ctx.font_src1, "");
        assert!(!ctx.inline_legacy);
        let css = Renderer::new().render("bootstrap", &template, &ctx).unwrap();
        assert!(css.contains("[class^=\"icon-\"]"));
        assert!(css.contains(".icon-home:before"));
    }

    #[test]
    fn test_styl_sources_on_one_line() {
        let config = BuildConfig::new("out").with_stylesheet(crate::StylesheetFamily::Styl);
        let template = stylesheet_template(None, config.syntax).unwrap();
        let css = Renderer::new().render("styl", &template, &context(&config)).unwrap();
        let styl = line_comments(&css).unwrap();

        assert!(styl.contains(concat!(
            "url(\"icons-abc.eot?#iefix\") format(\"embedded-opentype\"), ",
            "url(\"icons-abc.woff\") format(\"woff\"), ",
            "url(\"icons-abc.ttf\") format(\"truetype\");"
        )));
        assert!(!styl.contains(",\n\t\t"));
        assert!(styl.contains("// Icons"));

        let css_config = BuildConfig::new("out");
        let css = Renderer::new().render("css", &template, &context(&css_config)).unwrap();
        assert!(css.contains("format(\"embedded-opentype\"),\n\t\turl(\"icons-abc.woff\")"));
    }

    #[test]
    fn test_demo_context_forces_groups() {
        let mut config = BuildConfig::new("out");
        config.styles = StyleGroups { font: false, icon: false, extra: true };
        let ctx = context(&config).for_demo();
        assert!(ctx.fontface_styles && ctx.base_styles && ctx.icons_styles);
        assert!(!ctx.extra_styles);
    }

    #[test]
    fn test_line_comments() {
        let css = "/* Base class */\n.icon {}\n/*  Extra  */";
        assert_eq!(line_comments(css).unwrap(), "// Base class\n.icon {}\n// Extra");
    }
}
