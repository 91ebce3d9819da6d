#![allow(dead_code)]

use fontshape::context::LayoutMode;
use fontshape::glyph_data::TextDirection;
use fontshape::glyph_info::{FontId, FontMetricsCache, GlyphMetrics};
use fontshape::gpos::GlyphPositioningCollection;
use fontshape::gsub::GlyphSubstitutionCollection;

use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::vec2i;

pub const GLYPH_HEIGHT: i32 = 700;

pub fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> RectI {
    RectI::from_points(vec2i(x0, y0), vec2i(x1, y1))
}

/// A font containing `.notdef` plus `(glyph_id, advance_width)` glyphs.
pub fn font(font_id: FontId, glyphs: &[(u16, i32)]) -> FontMetricsCache {
    let notdef = GlyphMetrics::new(font_id, 0, 500, 0, rect(50, 0, 450, GLYPH_HEIGHT));
    font_without_notdef(font_id, glyphs).with_notdef(notdef)
}

/// A font with no `.notdef`, so unknown glyphs resolve to nothing.
pub fn font_without_notdef(font_id: FontId, glyphs: &[(u16, i32)]) -> FontMetricsCache {
    let mut cache = FontMetricsCache::new(font_id, 1000);
    for &(glyph_id, advance) in glyphs {
        cache.insert(GlyphMetrics::new(
            font_id,
            glyph_id,
            advance,
            0,
            rect(0, 0, advance, GLYPH_HEIGHT),
        ));
    }
    cache
}

/// Stand-in for a substitution pass: map each character through `cmap`, 0 when unmapped.
pub fn map_glyphs(
    text: &str,
    layout_mode: LayoutMode,
    cmap: &[(char, u16)],
) -> GlyphSubstitutionCollection {
    let mut collection = GlyphSubstitutionCollection::new(layout_mode);
    for (offset, ch) in text.chars().enumerate() {
        let glyph_id = cmap
            .iter()
            .find(|(c, _)| *c == ch)
            .map_or(0, |&(_, glyph_id)| glyph_id);
        collection.add_glyph(glyph_id, ch, TextDirection::LeftToRight, offset).unwrap();
    }
    collection
}

/// Every slot's glyph ids line up with the metrics stored for its offset.
pub fn assert_parallel(collection: &GlyphPositioningCollection) {
    for (offset, slot, metrics) in collection.iter() {
        let ids: Vec<u16> = metrics.iter().map(GlyphMetrics::glyph_id).collect();
        assert_eq!(slot.glyph_ids.as_slice(), ids.as_slice(), "offset {}", offset);
        assert_eq!(collection.try_get_metrics_at_offset(offset), Some(metrics));
    }
}

pub fn offsets(collection: &GlyphPositioningCollection) -> Vec<usize> {
    collection.iter().map(|(offset, _, _)| offset).collect()
}
