#![warn(rust_2018_idioms)]

//! Shaping collections: the per-glyph state that substitution and positioning operate on,
//! the merge of glyph resolutions across a chain of fallback fonts, and the positioning
//! adjustments applied to the merged result.

pub mod context;
pub mod error;
pub mod glyph_data;
pub mod glyph_info;
pub mod glyph_position;
pub mod gpos;
pub mod gsub;
pub mod tag;
pub mod unicode;
