//! Glyph positioning (`gpos`) collection.
//!
//! The positioning collection owns the final mapping from codepoint offsets to resolved
//! glyph metrics. It is built from one or more substitution passes, one per candidate font
//! in a fallback chain, and then adjusted in place by the positioning engine before the
//! layout engine reads out advances and offsets.
//!
//! Slots are addressed by index. Because a slot may hold several glyphs (decompositions and
//! colour layers), the mutation and query operations also take the font and glyph id of
//! the record to act on. Records that no longer match, for instance because a later font
//! replaced the slot, are silently ignored.

use log::debug;
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::{vec2i, Vector2I};
use rustc_hash::FxHashMap;

use crate::context::{check_index, LayoutMode, ShapingCollection};
use crate::error::ShapingError;
use crate::glyph_data::{renumber_attachments, FeatureEntry, GlyphShapingData};
use crate::glyph_info::{FontId, GlyphMetrics, MetricsSource, RenderOptions};
use crate::gsub::GlyphSubstitutionCollection;
use crate::unicode;

#[derive(Debug, Clone)]
pub struct GlyphPositioningCollection {
    slots: Vec<GlyphShapingData>,
    /// Codepoint offset of each slot, parallel to `slots`.
    offsets: Vec<usize>,
    metrics: FxHashMap<usize, Vec<GlyphMetrics>>,
    layout_mode: LayoutMode,
}

impl GlyphPositioningCollection {
    pub fn new(layout_mode: LayoutMode) -> Self {
        GlyphPositioningCollection {
            slots: Vec::new(),
            offsets: Vec::new(),
            metrics: FxHashMap::default(),
            layout_mode,
        }
    }

    pub fn is_vertical_layout_mode(&self) -> bool {
        self.layout_mode.is_vertical()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove every slot, returning the collection to its newly constructed state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.offsets.clear();
        self.metrics.clear();
    }

    /// The metrics resolved for the codepoint at `offset`, if that offset has been added.
    pub fn try_get_metrics_at_offset(&self, offset: usize) -> Option<&[GlyphMetrics]> {
        self.metrics.get(&offset).map(Vec::as_slice)
    }

    /// The metrics of the slot at `index`.
    pub fn metrics_at(&self, index: usize) -> Result<&[GlyphMetrics], ShapingError> {
        check_index(index, self.slots.len())?;
        Ok(self.slot_metrics(index))
    }

    /// The codepoint offset and shaping data of the slot at `index`.
    pub fn shaping_data_with_offset(
        &self,
        index: usize,
    ) -> Result<(usize, &GlyphShapingData), ShapingError> {
        check_index(index, self.slots.len())?;
        Ok((self.offsets[index], &self.slots[index]))
    }

    /// Iterate `(offset, slot, metrics)` in collection order.
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (usize, &GlyphShapingData, &[GlyphMetrics])> + '_ {
        (0..self.slots.len())
            .map(move |i| (self.offsets[i], &self.slots[i], self.slot_metrics(i)))
    }

    /// Returns `true` if any slot is still waiting on a fallback font.
    ///
    /// Control codepoints showing `.notdef` do not count.
    pub fn has_fallbacks(&self) -> bool {
        (0..self.slots.len())
            .any(|i| self.is_fallback(i) && !unicode::is_control(self.slots[i].codepoint))
    }

    /// Returns `true` if the slot at `index` holds glyphs from `font`.
    ///
    /// After merging several fonts, lookups from one font's positioning table must only be
    /// applied to that font's glyphs.
    pub fn should_process(&self, font: FontId, index: usize) -> bool {
        index < self.slots.len() && self.slot_metrics(index).iter().any(|m| m.font() == font)
    }

    /// Merge the output of a substitution pass for the font `source` into the collection.
    ///
    /// On the first call every slot of `collection` is resolved and added. On later calls
    /// only slots still showing a fallback glyph are resolved again with the new font; slots
    /// already resolved by an earlier font are left as they are, and slots whose offset is
    /// absent from `collection` are removed.
    ///
    /// Returns `true` if the collection contains no fallback glyphs afterwards. A fallback
    /// for a control codepoint is still replaced when a later font has a real glyph, but
    /// never makes the result `false`.
    pub fn try_add_or_update(
        &mut self,
        source: &dyn MetricsSource,
        collection: &GlyphSubstitutionCollection,
        options: RenderOptions,
    ) -> bool {
        if self.slots.is_empty() {
            return self.add(source, collection, options);
        }

        let mut has_fallbacks = false;
        let mut orphans = Vec::new();
        for i in 0..self.slots.len() {
            let offset = self.offsets[i];
            let data = match collection.try_get_shaping_data_at_offset(offset) {
                Some(data) => data,
                None => {
                    // This font combined the codepoint into a different ligature partition.
                    orphans.push(i);
                    continue;
                }
            };

            if !self.is_fallback(i) {
                continue;
            }

            let (metrics, fallback) = resolve(source, data, options);
            if metrics.is_empty() {
                // Keep the earlier fallback.
                has_fallbacks |= !unicode::is_control(data.codepoint);
                continue;
            }
            has_fallbacks |= fallback;
            self.slots[i] = positioned_slot(data, &metrics);
            self.metrics.insert(offset, metrics);
        }

        if !orphans.is_empty() {
            debug!(
                "font {:?}: pruning {} orphaned glyphs",
                source.font_id(),
                orphans.len()
            );
            self.remove_orphans(&orphans);
        }

        !has_fallbacks
    }

    fn add(
        &mut self,
        source: &dyn MetricsSource,
        collection: &GlyphSubstitutionCollection,
        options: RenderOptions,
    ) -> bool {
        let mut has_fallbacks = false;
        for (offset, data) in collection.iter() {
            let (metrics, fallback) = resolve(source, data, options);
            has_fallbacks |= fallback;
            if metrics.is_empty() {
                debug!(
                    "font {:?}: no glyph for U+{:04X} at offset {}",
                    source.font_id(),
                    u32::from(data.codepoint),
                    offset
                );
                continue;
            }
            self.slots.push(positioned_slot(data, &metrics));
            self.offsets.push(offset);
            self.metrics.insert(offset, metrics);
        }
        !has_fallbacks
    }

    /// Drop the slots at the ascending indices in `orphans`.
    fn remove_orphans(&mut self, orphans: &[usize]) {
        let slots = std::mem::take(&mut self.slots);
        let offsets = std::mem::take(&mut self.offsets);
        let mut orphans_iter = orphans.iter().copied().peekable();
        for (i, (slot, offset)) in slots.into_iter().zip(offsets).enumerate() {
            if orphans_iter.next_if_eq(&i).is_some() {
                self.metrics.remove(&offset);
            } else {
                self.slots.push(slot);
                self.offsets.push(offset);
            }
        }
        renumber_attachments(&mut self.slots, orphans);
    }

    /// The first glyph of a slot decides whether the whole slot is a fallback.
    fn is_fallback(&self, index: usize) -> bool {
        self.slot_metrics(index)
            .first()
            .is_some_and(GlyphMetrics::is_fallback)
    }

    fn slot_metrics(&self, index: usize) -> &[GlyphMetrics] {
        self.metrics
            .get(&self.offsets[index])
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn find_metrics(
        &self,
        font: FontId,
        index: usize,
        glyph_id: u16,
    ) -> Result<Option<&GlyphMetrics>, ShapingError> {
        check_index(index, self.slots.len())?;
        Ok(self
            .slot_metrics(index)
            .iter()
            .find(|m| m.matches(font, glyph_id)))
    }

    fn find_metrics_mut(
        &mut self,
        font: FontId,
        index: usize,
        glyph_id: u16,
    ) -> Result<Option<&mut GlyphMetrics>, ShapingError> {
        check_index(index, self.slots.len())?;
        Ok(self
            .metrics
            .get_mut(&self.offsets[index])
            .and_then(|metrics| metrics.iter_mut().find(|m| m.matches(font, glyph_id))))
    }

    /// Move the glyph by `(dx, dy)` without affecting its advance.
    pub fn offset_by(
        &mut self,
        font: FontId,
        index: usize,
        glyph_id: u16,
        dx: i32,
        dy: i32,
    ) -> Result<(), ShapingError> {
        if let Some(m) = self.find_metrics_mut(font, index, glyph_id)? {
            m.apply_offset(vec2i(dx, dy));
        }
        Ok(())
    }

    /// The current placement of the glyph, the origin of its bounds.
    pub fn offset_of(
        &self,
        font: FontId,
        index: usize,
        glyph_id: u16,
    ) -> Result<Vector2I, ShapingError> {
        let metrics = self.find_metrics(font, index, glyph_id)?;
        Ok(metrics.map_or(Vector2I::default(), |m| m.bounds().origin()))
    }

    /// Adjust the advance of the glyph.
    ///
    /// `dy` only applies in vertical layout mode; horizontal layout has no use for the
    /// vertical advance.
    pub fn advance_by(
        &mut self,
        font: FontId,
        index: usize,
        glyph_id: u16,
        dx: i32,
        dy: i32,
    ) -> Result<(), ShapingError> {
        let vertical = self.is_vertical_layout_mode();
        if let Some(m) = self.find_metrics_mut(font, index, glyph_id)? {
            m.set_advance_width(m.advance_width() + dx);
            if vertical {
                m.set_advance_height(m.advance_height() + dy);
            }
        }
        Ok(())
    }

    /// The advance of the glyph along the layout axis.
    ///
    /// The cross axis component is zero unless the advance along it has been zeroed (as for
    /// marks), in which case the bounds origin is reported instead so the positioning
    /// engine can place zero-advance glyphs without moving the pen.
    pub fn advance_of(
        &self,
        font: FontId,
        index: usize,
        glyph_id: u16,
    ) -> Result<Vector2I, ShapingError> {
        let vertical = self.is_vertical_layout_mode();
        let advance = self.find_metrics(font, index, glyph_id)?.map(|m| {
            let origin = m.bounds().origin();
            if vertical {
                let x = if m.advance_width() == 0 { origin.x() } else { 0 };
                vec2i(x, m.advance_height())
            } else {
                let y = if m.advance_height() == 0 { origin.y() } else { 0 };
                vec2i(m.advance_width(), y)
            }
        });
        Ok(advance.unwrap_or_default())
    }

    /// The advance box of the glyph: its bounds origin with the advance as size.
    ///
    /// Side bearings are not applied.
    pub fn advance_bounds_of(
        &self,
        font: FontId,
        index: usize,
        glyph_id: u16,
    ) -> Result<RectI, ShapingError> {
        let bounds = self.find_metrics(font, index, glyph_id)?.map(|m| {
            RectI::new(
                m.bounds().origin(),
                vec2i(m.advance_width(), m.advance_height()),
            )
        });
        Ok(bounds.unwrap_or_default())
    }

    pub fn set_advance_width(
        &mut self,
        font: FontId,
        index: usize,
        glyph_id: u16,
        advance_width: i32,
    ) -> Result<(), ShapingError> {
        if let Some(m) = self.find_metrics_mut(font, index, glyph_id)? {
            m.set_advance_width(advance_width);
        }
        Ok(())
    }

    pub fn set_advance_height(
        &mut self,
        font: FontId,
        index: usize,
        glyph_id: u16,
        advance_height: i32,
    ) -> Result<(), ShapingError> {
        if let Some(m) = self.find_metrics_mut(font, index, glyph_id)? {
            m.set_advance_height(advance_height);
        }
        Ok(())
    }

    pub fn set_advance(
        &mut self,
        font: FontId,
        index: usize,
        glyph_id: u16,
        x: i32,
        y: i32,
    ) -> Result<(), ShapingError> {
        if let Some(m) = self.find_metrics_mut(font, index, glyph_id)? {
            m.set_advance_width(x);
            m.set_advance_height(y);
        }
        Ok(())
    }

    /// Attach the mark at `index` to the glyph at `mark_index`.
    pub fn set_mark_attachment(
        &mut self,
        index: usize,
        mark_index: usize,
    ) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        check_index(mark_index, self.slots.len())?;
        self.slots[index] = GlyphShapingData {
            mark_attachment: Some(mark_index),
            ..self.slots[index].clone()
        };
        Ok(())
    }

    /// Cursively connect the glyph at `index` to the glyph at `target`.
    pub fn set_cursive_attachment(
        &mut self,
        index: usize,
        target: usize,
    ) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        check_index(target, self.slots.len())?;
        self.slots[index] = GlyphShapingData {
            cursive_attachment: Some(target),
            ..self.slots[index].clone()
        };
        Ok(())
    }

    pub fn set_bounds(&mut self, index: usize, bounds: RectI) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        self.slots[index] = GlyphShapingData {
            bounds,
            ..self.slots[index].clone()
        };
        Ok(())
    }
}

impl ShapingCollection for GlyphPositioningCollection {
    fn count(&self) -> usize {
        self.slots.len()
    }

    fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    fn shaping_data_at(&self, index: usize) -> Result<&GlyphShapingData, ShapingError> {
        self.slots.get(index).ok_or(ShapingError::IndexOutOfRange(index))
    }

    fn add_feature(&mut self, index: usize, entry: FeatureEntry) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        let mut slot = self.slots[index].clone();
        slot.add_feature(entry);
        self.slots[index] = slot;
        Ok(())
    }

    fn enable_feature(&mut self, index: usize, tag: u32) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        let mut slot = self.slots[index].clone();
        slot.enable_feature(tag);
        self.slots[index] = slot;
        Ok(())
    }
}

/// Resolve every glyph of `data` with `source`.
///
/// Returns the metrics and whether any of them is a fallback for a codepoint that needs a
/// real glyph.
fn resolve(
    source: &dyn MetricsSource,
    data: &GlyphShapingData,
    options: RenderOptions,
) -> (Vec<GlyphMetrics>, bool) {
    let needs_glyph = !unicode::is_control(data.codepoint);
    let mut has_fallback = false;
    let mut metrics = Vec::with_capacity(data.glyph_ids.len());
    for &glyph_id in data.glyph_ids.iter() {
        for mut m in source.resolve(data.codepoint, glyph_id, options.color_support) {
            has_fallback |= needs_glyph && m.is_fallback();
            m.set_codepoint(data.codepoint);
            metrics.push(m);
        }
    }
    (metrics, has_fallback)
}

/// The slot stored for `data`, with glyph ids matching the resolved `metrics`.
fn positioned_slot(data: &GlyphShapingData, metrics: &[GlyphMetrics]) -> GlyphShapingData {
    GlyphShapingData {
        glyph_ids: metrics.iter().map(GlyphMetrics::glyph_id).collect(),
        ..data.clone()
    }
}
