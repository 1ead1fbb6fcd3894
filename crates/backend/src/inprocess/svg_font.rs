//! SVG font document writer.

use super::outline::{ASCENT, DESCENT, GlyphOutline, UNITS_PER_EM};

/// Render an SVG font. `font_id` is the fragment stylesheets point at.
pub fn build_svg_font(font_id: &str, outlines: &[GlyphOutline]) -> String {
    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" standalone=\"no\"?>\n");
    svg.push_str(
        "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
         \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n",
    );
    svg.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\">\n<defs>\n");

    let id = escape(font_id);
    svg.push_str(&format!("<font id=\"{id}\" horiz-adv-x=\"{UNITS_PER_EM}\">\n"));
    svg.push_str(&format!(
        "<font-face font-family=\"{id}\" units-per-em=\"{UNITS_PER_EM}\" \
         ascent=\"{ASCENT}\" descent=\"-{DESCENT}\" />\n"
    ));
    svg.push_str("<missing-glyph horiz-adv-x=\"0\" />\n");

    for glyph in outlines {
        svg.push_str(&format!(
            "<glyph glyph-name=\"{}\" unicode=\"&#x{:X};\" horiz-adv-x=\"{}\"",
            escape(&glyph.name),
            glyph.codepoint,
            glyph.advance
        ));
        if !glyph.is_empty() {
            svg.push_str(&format!(" d=\"{}\"", glyph.path.to_svg()));
        }
        svg.push_str(" />\n");
    }

    svg.push_str("</font>\n</defs>\n</svg>\n");
    svg
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
