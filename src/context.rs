//! The contract shared by collections that participate in shaping.

use crate::error::ShapingError;
use crate::glyph_data::{FeatureEntry, GlyphShapingData};

/// Direction of text flow for a shaping operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Horizontal,
    Vertical,
}

impl LayoutMode {
    pub fn is_vertical(self) -> bool {
        self == LayoutMode::Vertical
    }
}

/// Indexed access to shaping slots.
///
/// Implemented by [GlyphSubstitutionCollection](crate::gsub::GlyphSubstitutionCollection),
/// the producer, and by
/// [GlyphPositioningCollection](crate::gpos::GlyphPositioningCollection), which the
/// positioning engine walks.
pub trait ShapingCollection {
    /// The number of slots in the collection.
    fn count(&self) -> usize;

    fn layout_mode(&self) -> LayoutMode;

    /// Shaping data of the slot at `index`.
    fn shaping_data_at(&self, index: usize) -> Result<&GlyphShapingData, ShapingError>;

    /// Output glyph ids of the slot at `index`.
    fn glyph_ids_at(&self, index: usize) -> Result<&[u16], ShapingError> {
        self.shaping_data_at(index).map(|data| data.glyph_ids.as_slice())
    }

    /// Append a feature to the slot at `index`.
    ///
    /// Entries are not deduplicated; the same tag may legitimately appear more than once
    /// with different scopes.
    fn add_feature(&mut self, index: usize, entry: FeatureEntry) -> Result<(), ShapingError>;

    /// Enable the first feature entry of the slot at `index` with a matching tag.
    ///
    /// Does nothing if the slot has no such entry.
    fn enable_feature(&mut self, index: usize, tag: u32) -> Result<(), ShapingError>;
}

pub(crate) fn check_index(index: usize, count: usize) -> Result<(), ShapingError> {
    if index < count {
        Ok(())
    } else {
        Err(ShapingError::IndexOutOfRange(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph_data::TextDirection;

    #[test]
    fn test_defaults() {
        assert_eq!(LayoutMode::default(), LayoutMode::Horizontal);
        assert!(!LayoutMode::default().is_vertical());
        assert_eq!(TextDirection::default(), TextDirection::LeftToRight);
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index(2, 3), Ok(()));
        assert_eq!(check_index(3, 3), Err(ShapingError::IndexOutOfRange(3)));
    }
}
