//! Per-slot shaping state shared by the substitution and positioning collections.

use bitflags::bitflags;
use pathfinder_geometry::rect::RectI;
use tinyvec::{tiny_vec, TinyVec};

use crate::tag::DisplayTag;

/// Direction of the text run a slot belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

bitflags! {
    /// Record of the substitutions applied to a slot.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct GlyphFlags: u8 {
        /// The slot holds the output of a one-to-many substitution.
        const DECOMPOSED  = 0b00000001;
        /// The slot's glyph id was replaced by a substitution lookup.
        const SUBSTITUTED = 0b00000010;
    }
}

/// A shaping feature applicable to a slot.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FeatureEntry {
    pub tag: u32,
    pub enabled: bool,
    /// Script tag the feature is restricted to, `None` when it applies to every script.
    pub scope: Option<u32>,
}

impl FeatureEntry {
    pub const fn new(tag: u32, enabled: bool) -> Self {
        FeatureEntry {
            tag,
            enabled,
            scope: None,
        }
    }

    pub const fn scoped(tag: u32, enabled: bool, script: u32) -> Self {
        FeatureEntry {
            tag,
            enabled,
            scope: Some(script),
        }
    }
}

impl std::fmt::Debug for FeatureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureEntry")
            .field("tag", &DisplayTag(self.tag))
            .field("enabled", &self.enabled)
            .field("scope", &self.scope.map(DisplayTag))
            .finish()
    }
}

/// Shaping state for a single input position.
///
/// A slot starts life as one codepoint mapped to one glyph. Substitution may replace the
/// glyph, expand it to several glyphs (decomposition) or fold the following slots into it
/// (ligation), in which case `codepoint_count` grows to cover every source codepoint.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphShapingData {
    /// Output glyph ids. More than one only for decompositions kept in a single slot.
    pub glyph_ids: TinyVec<[u16; 1]>,
    /// Leading source codepoint.
    pub codepoint: char,
    /// Number of source codepoints this slot covers, always at least 1.
    pub codepoint_count: u32,
    pub direction: TextDirection,
    /// Ligature group identifier, 0 when the slot is not part of a ligature.
    pub ligature_id: u32,
    /// Position of this slot within its ligature.
    pub ligature_component: Option<u16>,
    /// Index of the slot this mark is attached to.
    pub mark_attachment: Option<usize>,
    /// Index of the slot this glyph is cursively connected to.
    pub cursive_attachment: Option<usize>,
    pub features: Vec<FeatureEntry>,
    /// Positioning bounds, independent of the glyph advance.
    pub bounds: RectI,
    pub flags: GlyphFlags,
}

impl GlyphShapingData {
    pub fn new(glyph_id: u16, codepoint: char, direction: TextDirection) -> Self {
        GlyphShapingData {
            glyph_ids: tiny_vec![[u16; 1] => glyph_id],
            codepoint,
            codepoint_count: 1,
            direction,
            ligature_id: 0,
            ligature_component: None,
            mark_attachment: None,
            cursive_attachment: None,
            features: Vec::new(),
            bounds: RectI::default(),
            flags: GlyphFlags::empty(),
        }
    }

    pub fn is_decomposed(&self) -> bool {
        self.flags.contains(GlyphFlags::DECOMPOSED)
    }

    pub fn is_substituted(&self) -> bool {
        self.flags.contains(GlyphFlags::SUBSTITUTED)
    }

    pub fn is_ligature(&self) -> bool {
        self.ligature_id != 0
    }

    /// Returns `true` if `tag` is present and enabled for this slot.
    pub fn feature_enabled(&self, tag: u32) -> bool {
        self.features.iter().any(|f| f.tag == tag && f.enabled)
    }

    pub(crate) fn add_feature(&mut self, entry: FeatureEntry) {
        self.features.push(entry);
    }

    /// Enable the first feature entry carrying `tag`.
    pub(crate) fn enable_feature(&mut self, tag: u32) {
        if let Some(entry) = self.features.iter_mut().find(|f| f.tag == tag) {
            entry.enabled = true;
        }
    }
}

/// Renumber attachments after the slots at the sorted indices in `removed` were deleted.
///
/// Attachments that pointed at a removed slot are cleared.
pub(crate) fn renumber_attachments(slots: &mut [GlyphShapingData], removed: &[usize]) {
    let renumber = |target: Option<usize>| {
        target.and_then(|i| match removed.binary_search(&i) {
            Ok(_) => None,
            Err(shift) => Some(i - shift),
        })
    };
    for slot in slots.iter_mut() {
        slot.mark_attachment = renumber(slot.mark_attachment);
        slot.cursive_attachment = renumber(slot.cursive_attachment);
    }
}
