//! Glyph substitution collection.
//!
//! Holds the output of substitution (`gsub`) for one candidate font. Each slot is keyed by
//! the offset of its leading codepoint in the input text, and that key is what the
//! [positioning collection](crate::gpos::GlyphPositioningCollection) joins on when it
//! merges resolutions from several fonts.

use std::ops::Range;

use rustc_hash::FxHashMap;
use tinyvec::TinyVec;

use crate::context::{check_index, LayoutMode, ShapingCollection};
use crate::error::ShapingError;
use crate::glyph_data::{FeatureEntry, GlyphFlags, GlyphShapingData, TextDirection};

#[derive(Debug, Clone)]
pub struct GlyphSubstitutionCollection {
    slots: Vec<GlyphShapingData>,
    offsets: Vec<usize>,
    /// Slot index of each offset in `offsets`.
    indices: FxHashMap<usize, usize>,
    layout_mode: LayoutMode,
    next_ligature_id: u32,
}

impl GlyphSubstitutionCollection {
    pub fn new(layout_mode: LayoutMode) -> Self {
        GlyphSubstitutionCollection {
            slots: Vec::new(),
            offsets: Vec::new(),
            indices: FxHashMap::default(),
            layout_mode,
            next_ligature_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.offsets.clear();
        self.indices.clear();
        self.next_ligature_id = 1;
    }

    /// Append the glyph mapped from the codepoint at `offset`.
    ///
    /// Each offset identifies exactly one slot, so an offset that is already present is
    /// rejected.
    pub fn add_glyph(
        &mut self,
        glyph_id: u16,
        codepoint: char,
        direction: TextDirection,
        offset: usize,
    ) -> Result<(), ShapingError> {
        if self.indices.contains_key(&offset) {
            return Err(ShapingError::DuplicateOffset(offset));
        }
        self.indices.insert(offset, self.slots.len());
        self.slots.push(GlyphShapingData::new(glyph_id, codepoint, direction));
        self.offsets.push(offset);
        Ok(())
    }

    /// The codepoint offset and shaping data of the slot at `index`.
    pub fn shaping_data_with_offset(
        &self,
        index: usize,
    ) -> Result<(usize, &GlyphShapingData), ShapingError> {
        check_index(index, self.slots.len())?;
        Ok((self.offsets[index], &self.slots[index]))
    }

    /// Shaping data of the slot whose leading codepoint is at `offset`, if any.
    pub fn try_get_shaping_data_at_offset(&self, offset: usize) -> Option<&GlyphShapingData> {
        self.indices.get(&offset).map(|&index| &self.slots[index])
    }

    /// Iterate `(offset, slot)` pairs in collection order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &GlyphShapingData)> + '_ {
        self.offsets.iter().copied().zip(self.slots.iter())
    }

    /// Single substitution: replace the glyph of the slot at `index`.
    pub fn replace_glyph_id(&mut self, index: usize, glyph_id: u16) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        let slot = &mut self.slots[index];
        slot.glyph_ids = TinyVec::from([glyph_id]);
        slot.flags.insert(GlyphFlags::SUBSTITUTED);
        Ok(())
    }

    /// Multiple substitution: expand the slot at `index` into `glyph_ids`, kept together in
    /// the one slot.
    ///
    /// An empty `glyph_ids` leaves the slot unchanged.
    pub fn replace_with_glyph_ids(
        &mut self,
        index: usize,
        glyph_ids: &[u16],
    ) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        if glyph_ids.is_empty() {
            return Ok(());
        }
        let slot = &mut self.slots[index];
        slot.glyph_ids = glyph_ids.iter().copied().collect();
        slot.flags.insert(GlyphFlags::DECOMPOSED | GlyphFlags::SUBSTITUTED);
        Ok(())
    }

    /// Ligature substitution: fold the `count` slots starting at `index` into a single slot
    /// showing `glyph_id`.
    ///
    /// The ligature keeps the first slot's offset; the offsets of the folded slots are no
    /// longer present in the collection. Returns the id assigned to the new ligature.
    pub fn ligate(
        &mut self,
        index: usize,
        count: usize,
        glyph_id: u16,
    ) -> Result<u32, ShapingError> {
        check_index(index, self.slots.len())?;
        let end = index.saturating_add(count.max(1));
        check_index(end - 1, self.slots.len())?;

        let folded: u32 = self.slots[index + 1..end]
            .iter()
            .map(|slot| slot.codepoint_count)
            .sum();
        self.remove_range(index + 1..end);

        let ligature_id = self.next_ligature_id;
        self.next_ligature_id += 1;

        let slot = &mut self.slots[index];
        slot.glyph_ids = TinyVec::from([glyph_id]);
        slot.codepoint_count += folded;
        slot.ligature_id = ligature_id;
        slot.ligature_component = None;
        slot.flags.insert(GlyphFlags::SUBSTITUTED);
        Ok(ligature_id)
    }

    /// Remove the slot at `index`, for example a deleted joiner.
    pub fn remove(&mut self, index: usize) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        self.remove_range(index..index + 1);
        Ok(())
    }

    /// Record that the slot at `index` is a component of the ligature at `ligature_index`.
    pub fn set_ligature_component(
        &mut self,
        index: usize,
        ligature_index: usize,
        component: u16,
    ) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        check_index(ligature_index, self.slots.len())?;
        let ligature_id = self.slots[ligature_index].ligature_id;
        let slot = &mut self.slots[index];
        slot.ligature_id = ligature_id;
        slot.ligature_component = Some(component);
        Ok(())
    }

    /// Remove `range`, reindexing the offsets that follow it.
    fn remove_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let start = range.start;
        for offset in self.offsets.drain(range.clone()) {
            self.indices.remove(&offset);
        }
        self.slots.drain(range);
        for (index, &offset) in self.offsets.iter().enumerate().skip(start) {
            self.indices.insert(offset, index);
        }
    }
}

impl ShapingCollection for GlyphSubstitutionCollection {
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
        self.slots[index].add_feature(entry);
        Ok(())
    }

    fn enable_feature(&mut self, index: usize, tag: u32) -> Result<(), ShapingError> {
        check_index(index, self.slots.len())?;
        self.slots[index].enable_feature(tag);
        Ok(())
    }
}
