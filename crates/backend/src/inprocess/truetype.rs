//! TrueType font assembly from glyph outlines.

use font_types::{
    FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord, Version16Dot16,
};
use kurbo::{BezPath, PathEl, Point};
use read_fonts::tables::glyf::CurvePoint;
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{Bbox, Contour, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

use super::outline::{ASCENT, DESCENT, GlyphOutline, UNITS_PER_EM};
use crate::error::{Error, Result};

/// OS/2 unicode range bit 60 (Private Use Area), stored in the second word.
const PRIVATE_USE_RANGE_BIT: u32 = 1 << (60 - 32);

/// Windows platform, Unicode BMP encoding, US English.
const WINDOWS_EN: (u16, u16, u16) = (3, 1, 0x409);

/// Glyph converted to TrueType contours.
struct BuiltGlyph {
    glyph: Glyph,
    advance: u16,
    points: u16,
    contours: u16,
}

impl BuiltGlyph {
    fn bbox(&self) -> Option<Bbox> {
        match &self.glyph {
            Glyph::Simple(simple) => Some(simple.bbox),
            _ => None,
        }
    }
}

/// Build a TrueType font. Glyph 0 is an empty `.notdef`.
pub fn build_truetype(family: &str, outlines: &[GlyphOutline]) -> Result<Vec<u8>> {
    let mut glyphs = vec![BuiltGlyph {
        glyph: Glyph::Empty,
        advance: UNITS_PER_EM / 2,
        points: 0,
        contours: 0,
    }];
    for outline in outlines {
        glyphs.push(build_glyph(outline)?);
    }

    let mut mappings = Vec::with_capacity(outlines.len());
    for (gid, outline) in outlines.iter().enumerate() {
        let ch = char::from_u32(outline.codepoint).ok_or(Error::InvalidCodepoint(outline.codepoint))?;
        mappings.push((ch, GlyphId::new(gid as u32 + 1)));
    }
    let cmap = Cmap::from_mappings(mappings).map_err(|e| Error::Glyph {
        name: family.to_string(),
        message: format!("{e:?}"),
    })?;

    let mut glyf_builder = GlyfLocaBuilder::new();
    for built in &glyphs {
        glyf_builder.add_glyph(&built.glyph).map_err(|e| Error::Glyph {
            name: family.to_string(),
            message: format!("{e:?}"),
        })?;
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let bounds = FontBounds::from_glyphs(&glyphs);
    let num_glyphs = glyphs.len() as u16;

    let head = Head {
        font_revision: Fixed::from_f64(1.0),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: Flags::empty(),
        units_per_em: UNITS_PER_EM,
        // Fixed timestamps keep rebuilt fonts byte-identical.
        created: LongDateTime::new(0),
        modified: LongDateTime::new(0),
        x_min: bounds.x_min,
        y_min: bounds.y_min,
        x_max: bounds.x_max,
        y_max: bounds.y_max,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        },
    };

    let hhea = Hhea {
        ascender: FWord::new(ASCENT),
        descender: FWord::new(-DESCENT),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(bounds.advance_max),
        min_left_side_bearing: FWord::new(bounds.min_lsb),
        min_right_side_bearing: FWord::new(bounds.min_rsb),
        x_max_extent: FWord::new(bounds.x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };

    let hmtx = Hmtx {
        h_metrics: glyphs
            .iter()
            .map(|g| LongMetric {
                advance: g.advance,
                side_bearing: g.bbox().map_or(0, |b| b.x_min),
            })
            .collect(),
        left_side_bearings: vec![],
    };

    let maxp = Maxp {
        num_glyphs,
        max_points: Some(glyphs.iter().map(|g| g.points).max().unwrap_or(0)),
        max_contours: Some(glyphs.iter().map(|g| g.contours).max().unwrap_or(0)),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let post = Post {
        version: Version16Dot16::VERSION_3_0,
        italic_angle: Fixed::from_f64(0.0),
        underline_position: FWord::new(-DESCENT),
        underline_thickness: FWord::new(UNITS_PER_EM as i16 / 16),
        is_fixed_pitch: 0,
        min_mem_type42: 0,
        max_mem_type42: 0,
        min_mem_type1: 0,
        max_mem_type1: 0,
        num_glyphs: Some(num_glyphs),
        glyph_name_index: None,
        string_data: None,
    };

    let codepoints = outlines.iter().map(|o| o.codepoint);
    let first_char = codepoints.clone().min().unwrap_or(0).min(0xFFFF) as u16;
    let last_char = codepoints.clone().max().unwrap_or(0).min(0xFFFF) as u16;
    let private_use = outlines.iter().any(|o| (0xE000..=0xF8FF).contains(&o.codepoint));

    let os2 = Os2 {
        x_avg_char_width: bounds.avg_advance as i16,
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: 332,
        y_subscript_y_size: 307,
        y_subscript_x_offset: 0,
        y_subscript_y_offset: 38,
        y_superscript_x_size: 332,
        y_superscript_y_size: 307,
        y_superscript_x_offset: 0,
        y_superscript_y_offset: 179,
        y_strikeout_size: 26,
        y_strikeout_position: 154,
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: 0,
        ul_unicode_range_2: if private_use { PRIVATE_USE_RANGE_BIT } else { 0 },
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: Tag::new(b"NONE"),
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: first_char,
        us_last_char_index: last_char,
        s_typo_ascender: ASCENT,
        s_typo_descender: -DESCENT,
        s_typo_line_gap: 0,
        us_win_ascent: ASCENT as u16,
        us_win_descent: DESCENT as u16,
        ul_code_page_range_1: Some(1),
        ul_code_page_range_2: Some(0),
        sx_height: Some(0),
        s_cap_height: Some(0),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    };

    let mut builder = FontBuilder::new();
    builder.add_table(&head)?;
    builder.add_table(&hhea)?;
    builder.add_table(&hmtx)?;
    builder.add_table(&maxp)?;
    builder.add_table(&cmap)?;
    builder.add_table(&post)?;
    builder.add_table(&glyf)?;
    builder.add_table(&loca)?;
    builder.add_table(&os2)?;
    builder.add_table(&build_name(family))?;

    Ok(builder.build())
}

fn build_name(family: &str) -> Name {
    let (platform, encoding, language) = WINDOWS_EN;
    let entries = [
        (1, family.to_string()),
        (2, "Regular".to_string()),
        (3, format!("{family}:Regular")),
        (4, family.to_string()),
        (5, "Version 1.0".to_string()),
        (6, family.replace(' ', "")),
    ];
    Name::new(
        entries
            .into_iter()
            .map(|(id, value)| {
                NameRecord::new(platform, encoding, language, NameId::new(id), value.into())
            })
            .collect(),
    )
}

fn build_glyph(outline: &GlyphOutline) -> Result<BuiltGlyph> {
    if outline.is_empty() {
        return Ok(BuiltGlyph { glyph: Glyph::Empty, advance: outline.advance, points: 0, contours: 0 });
    }

    let contours = contours_from_path(&outline.quadratic());
    let points = glyph_count(&outline.name, "points", contours.iter().map(Vec::len).sum())?;
    let contour_count = glyph_count(&outline.name, "contours", contours.len())?;

    let mut glyph = SimpleGlyph {
        bbox: Bbox::default(),
        contours: contours.into_iter().map(Contour::from).collect(),
        instructions: vec![],
    };
    glyph.recompute_bounding_box();

    Ok(BuiltGlyph {
        glyph: Glyph::Simple(glyph),
        advance: outline.advance,
        points,
        contours: contour_count,
    })
}

/// glyf stores point and contour counts as u16.
fn glyph_count(name: &str, what: &str, count: usize) -> Result<u16> {
    u16::try_from(count).map_err(|_| Error::Glyph {
        name: name.to_string(),
        message: format!("{count} {what} exceed the TrueType limit of {}", u16::MAX),
    })
}

/// Split a quadratic path into closed TrueType contours.
fn contours_from_path(path: &BezPath) -> Vec<Vec<CurvePoint>> {
    let mut contours = Vec::new();
    let mut current: Vec<CurvePoint> = Vec::new();

    let mut finish = |points: &mut Vec<CurvePoint>| {
        // The closing segment is implicit in TrueType.
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        if points.len() > 1 {
            contours.push(std::mem::take(points));
        } else {
            points.clear();
        }
    };

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish(&mut current);
                current.push(on_curve(p));
            }
            PathEl::LineTo(p) => current.push(on_curve(p)),
            PathEl::QuadTo(c, p) => {
                current.push(off_curve(c));
                current.push(on_curve(p));
            }
            // Cubics are gone after `GlyphOutline::quadratic`.
            PathEl::CurveTo(_, _, p) => current.push(on_curve(p)),
            PathEl::ClosePath => finish(&mut current),
        }
    }
    finish(&mut current);
    contours
}

fn on_curve(p: Point) -> CurvePoint {
    CurvePoint::new(clamp_i16(p.x), clamp_i16(p.y), true)
}

fn off_curve(p: Point) -> CurvePoint {
    CurvePoint::new(clamp_i16(p.x), clamp_i16(p.y), false)
}

fn clamp_i16(v: f64) -> i16 {
    v.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

/// Font-wide metrics gathered from every glyph.
struct FontBounds {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    advance_max: u16,
    avg_advance: u16,
    min_lsb: i16,
    min_rsb: i16,
    x_max_extent: i16,
}

impl FontBounds {
    fn from_glyphs(glyphs: &[BuiltGlyph]) -> Self {
        let boxes: Vec<(Bbox, u16)> =
            glyphs.iter().filter_map(|g| g.bbox().map(|b| (b, g.advance))).collect();
        let advance_total: u32 = glyphs.iter().map(|g| u32::from(g.advance)).sum();

        Self {
            x_min: boxes.iter().map(|(b, _)| b.x_min).min().unwrap_or(0),
            y_min: boxes.iter().map(|(b, _)| b.y_min).min().unwrap_or(0),
            x_max: boxes.iter().map(|(b, _)| b.x_max).max().unwrap_or(0),
            y_max: boxes.iter().map(|(b, _)| b.y_max).max().unwrap_or(0),
            advance_max: glyphs.iter().map(|g| g.advance).max().unwrap_or(0),
            avg_advance: (advance_total / glyphs.len().max(1) as u32) as u16,
            min_lsb: boxes.iter().map(|(b, _)| b.x_min).min().unwrap_or(0),
            min_rsb: boxes
                .iter()
                .map(|(b, advance)| (i32::from(*advance) - i32::from(b.x_max)) as i16)
                .min()
                .unwrap_or(0),
            x_max_extent: boxes.iter().map(|(b, _)| b.x_max).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use read_fonts::{FontRef, TableProvider};

    use super::*;

    fn square(name: &str, codepoint: u32) -> GlyphOutline {
        GlyphOutline {
            name: name.into(),
            codepoint,
            advance: 512,
            path: BezPath::from_svg("M0 -64L512 -64L512 448L0 448Z").unwrap(),
        }
    }

    #[test]
    fn test_cmap_maps_codepoints() {
        let data = build_truetype("icons", &[square("home", 0xF101), square("search", 0xF200)])
            .unwrap();
        let font = FontRef::new(&data).expect("parse font");
        let cmap = font.cmap().expect("cmap");
        assert_eq!(cmap.map_codepoint(0xF101u32), Some(GlyphId::new(1)));
        assert_eq!(cmap.map_codepoint(0xF200u32), Some(GlyphId::new(2)));
        assert_eq!(font.maxp().expect("maxp").num_glyphs(), 3);
    }

    #[test]
    fn test_head_bounds() {
        let data = build_truetype("icons", &[square("home", 0xF101)]).unwrap();
        let font = FontRef::new(&data).unwrap();
        let head = font.head().unwrap();
        assert_eq!(head.units_per_em(), UNITS_PER_EM);
        assert_eq!(head.y_min(), -64);
        assert_eq!(head.y_max(), 448);
    }

    #[test]
    fn test_glyph_counts_fit_u16() {
        assert_eq!(glyph_count("home", "points", 65535).unwrap(), u16::MAX);
        let err = glyph_count("home", "points", 65536).unwrap_err();
        assert!(matches!(err, Error::Glyph { ref name, .. } if name == "home"));
        assert!(err.to_string().contains("65536 points"));
    }

    #[test]
    fn test_contours_drop_closing_point() {
        let path = BezPath::from_svg("M0 0L10 0L10 10L0 0Z").unwrap();
        let contours = contours_from_path(&path);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 3);
    }

    #[test]
    fn test_invalid_codepoint() {
        let err = build_truetype("icons", &[square("bad", 0xD800)]).unwrap_err();
        assert!(matches!(err, Error::InvalidCodepoint(0xD800)));
    }
}
