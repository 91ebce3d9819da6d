//! Final glyph positions read out of a positioning collection.

use std::ops::Range;

use crate::error::ShapingError;
use crate::glyph_data::TextDirection;
use crate::glyph_info::{FontId, GlyphMetrics};
use crate::gpos::GlyphPositioningCollection;

pub struct GlyphLayout<'a> {
    collection: &'a GlyphPositioningCollection,
    vertical: bool,
}

/// A glyph ready for drawing.
///
/// The advance moves the pen after the glyph is drawn. The offset moves the glyph itself
/// relative to the pen and does not affect the advance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlyphPosition {
    pub glyph_id: u16,
    pub font: FontId,
    pub codepoint: char,
    pub hori_advance: i32,
    pub vert_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl<'a> GlyphLayout<'a> {
    pub fn new(collection: &'a GlyphPositioningCollection) -> Self {
        GlyphLayout {
            collection,
            vertical: collection.is_vertical_layout_mode(),
        }
    }

    /// One position per metrics record, in logical order.
    ///
    /// Right-to-left slots are expected to be drawn in reverse order; mark placement
    /// accounts for this.
    pub fn glyph_positions(&self) -> Result<Vec<GlyphPosition>, ShapingError> {
        let mut has_marks = false;
        let mut positions = Vec::with_capacity(self.collection.len());
        let mut slot_ranges = Vec::with_capacity(self.collection.len());

        for (_offset, data, metrics) in self.collection.iter() {
            let start = positions.len();
            positions.extend(metrics.iter().map(|m| GlyphPosition::from_metrics(m, self.vertical)));
            slot_ranges.push(start..positions.len());
            has_marks |= data.mark_attachment.is_some();
        }

        if has_marks {
            // Now that every base glyph has its final offset, shift marks over their bases.
            self.position_marks(&slot_ranges, &mut positions)?;
        }

        Ok(positions)
    }

    fn position_marks(
        &self,
        slot_ranges: &[Range<usize>],
        positions: &mut [GlyphPosition],
    ) -> Result<(), ShapingError> {
        for (i, (_offset, data, _metrics)) in self.collection.iter().enumerate() {
            let base_index = match data.mark_attachment {
                Some(base_index) => base_index,
                None => continue,
            };
            let base = slot_ranges
                .get(base_index)
                .ok_or(ShapingError::IndexOutOfRange(base_index))?;
            let mark = &slot_ranges[i];

            // The pen distance from the base to the mark, in drawing order.
            let (hori_distance, vert_distance) = match data.direction {
                TextDirection::LeftToRight if base_index <= i => {
                    negate(sum_advance(&positions[base.start..mark.start]))
                }
                TextDirection::LeftToRight => sum_advance(&positions[mark.start..base.start]),
                TextDirection::RightToLeft if base_index < i => {
                    sum_advance(&positions[base.end..mark.end])
                }
                TextDirection::RightToLeft => negate(sum_advance(&positions[mark.end..base.end])),
            };

            let (base_x, base_y) = match positions.get(base.start) {
                Some(base_pos) => (base_pos.x_offset, base_pos.y_offset),
                None => (0, 0),
            };
            for position in &mut positions[mark.clone()] {
                position.x_offset += base_x + hori_distance;
                position.y_offset += base_y + vert_distance;
            }
        }
        Ok(())
    }
}

impl GlyphPosition {
    fn from_metrics(metrics: &GlyphMetrics, vertical: bool) -> Self {
        let (hori_advance, vert_advance) = if vertical {
            (0, metrics.advance_height())
        } else {
            (metrics.advance_width(), 0)
        };
        let placement = metrics.placement();
        GlyphPosition {
            glyph_id: metrics.glyph_id(),
            font: metrics.font(),
            codepoint: metrics.codepoint(),
            hori_advance,
            vert_advance,
            x_offset: placement.x(),
            y_offset: placement.y(),
        }
    }
}

fn sum_advance(positions: &[GlyphPosition]) -> (i32, i32) {
    positions.iter().fold((0, 0), |(hori, vert), pos| {
        (hori + pos.hori_advance, vert + pos.vert_advance)
    })
}

fn negate((hori, vert): (i32, i32)) -> (i32, i32) {
    (-hori, -vert)
}
