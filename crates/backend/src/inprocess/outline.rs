//! Glyph outlines from SVG sources, in font units.

use kurbo::{Affine, BezPath, CubicBez, PathEl, Point, Shape};
use usvg::tiny_skia_path::PathSegment;

use crate::{
    error::{Error, Result},
    types::GlyphSource,
};

pub const UNITS_PER_EM: u16 = 512;
pub const ASCENT: i16 = 448;
pub const DESCENT: i16 = 64;

/// Maximum distance between a cubic and its quadratic approximation, in font units.
const QUAD_ACCURACY: f64 = 0.5;

/// One glyph scaled into the em square, y axis pointing up.
#[derive(Debug, Clone)]
pub struct GlyphOutline {
    pub name: String,
    pub codepoint: u32,
    pub advance: u16,
    pub path: BezPath,
}

impl GlyphOutline {
    /// Parse an SVG source and map it onto the em square.
    ///
    /// The document height maps to the full em, the baseline sits at
    /// `DESCENT` units above the bottom edge. Only filled paths contribute.
    pub fn from_svg(glyph: &GlyphSource, codepoint: u32) -> Result<Self> {
        let svg_error =
            |message: String| Error::Svg { name: glyph.name.clone(), message };

        let tree = usvg::Tree::from_data(&glyph.bytes, &usvg::Options::default())
            .map_err(|e| svg_error(e.to_string()))?;

        let size = tree.size();
        if size.height() <= 0.0 {
            return Err(svg_error("document has no height".into()));
        }
        let scale = f64::from(UNITS_PER_EM) / f64::from(size.height());

        let mut path = BezPath::new();
        collect_paths(tree.root(), &mut path);
        path.apply_affine(Affine::new([scale, 0.0, 0.0, -scale, 0.0, f64::from(ASCENT)]));

        Ok(Self {
            name: glyph.name.clone(),
            codepoint,
            advance: (f64::from(size.width()) * scale).round() as u16,
            path,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    /// The outline with every cubic replaced by quadratic splines.
    pub fn quadratic(&self) -> BezPath {
        to_quadratic(&self.path)
    }

    /// Bounding box in font units, or `None` for an empty glyph.
    pub fn bounds(&self) -> Option<kurbo::Rect> {
        (!self.is_empty()).then(|| self.path.bounding_box())
    }
}

fn collect_paths(group: &usvg::Group, out: &mut BezPath) {
    for node in group.children() {
        match node {
            usvg::Node::Group(group) => collect_paths(group, out),
            usvg::Node::Path(path) if path.fill().is_some() => append_path(path, out),
            _ => {}
        }
    }
}

fn append_path(path: &usvg::Path, out: &mut BezPath) {
    let ts = path.abs_transform();
    let map = |p: usvg::tiny_skia_path::Point| {
        Point::new(
            f64::from(ts.sx * p.x + ts.kx * p.y + ts.tx),
            f64::from(ts.ky * p.x + ts.sy * p.y + ts.ty),
        )
    };

    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => out.move_to(map(p)),
            PathSegment::LineTo(p) => out.line_to(map(p)),
            PathSegment::QuadTo(p1, p2) => out.quad_to(map(p1), map(p2)),
            PathSegment::CubicTo(p1, p2, p3) => out.curve_to(map(p1), map(p2), map(p3)),
            PathSegment::Close => out.close_path(),
        }
    }
}

fn to_quadratic(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to(p);
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                out.line_to(p);
                current = p;
            }
            PathEl::QuadTo(p1, p2) => {
                out.quad_to(p1, p2);
                current = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                for (_, _, quad) in CubicBez::new(current, p1, p2, p3).to_quads(QUAD_ACCURACY) {
                    out.quad_to(quad.p1, quad.p2);
                }
                current = p3;
            }
            PathEl::ClosePath => {
                out.close_path();
                current = start;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 16 16"><path d="M0 0H16V16H0Z"/></svg>"#;
    const CIRCLE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32"><circle cx="16" cy="16" r="8"/></svg>"#;

    fn glyph(svg: &str) -> GlyphSource {
        GlyphSource::new("test", "test.svg", svg.as_bytes().to_vec())
    }

    #[test]
    fn test_square_fills_em() {
        let outline = GlyphOutline::from_svg(&glyph(SQUARE), 0xF101).unwrap();
        assert_eq!(outline.advance, UNITS_PER_EM);
        let bounds = outline.bounds().unwrap();
        assert!((bounds.y0 - f64::from(-DESCENT)).abs() < 1e-6);
        assert!((bounds.y1 - f64::from(ASCENT)).abs() < 1e-6);
        assert!((bounds.width() - f64::from(UNITS_PER_EM)).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_has_no_cubics() {
        let outline = GlyphOutline::from_svg(&glyph(CIRCLE), 0xF101).unwrap();
        let quad = outline.quadratic();
        assert!(!quad.elements().is_empty());
        assert!(quad.elements().iter().all(|el| !matches!(el, PathEl::CurveTo(..))));
    }

    #[test]
    fn test_unfilled_paths_are_skipped() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><path d="M0 0H16" fill="none" stroke="black"/></svg>"#;
        let outline = GlyphOutline::from_svg(&glyph(svg), 0xF101).unwrap();
        assert!(outline.is_empty());
        assert!(outline.bounds().is_none());
    }

    #[test]
    fn test_invalid_svg() {
        let err = GlyphOutline::from_svg(&glyph("not svg"), 0xF101).unwrap_err();
        assert!(matches!(err, Error::Svg { .. }));
    }
}
