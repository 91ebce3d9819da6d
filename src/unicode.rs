//! Codepoint classification used while merging glyph resolutions.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Returns `true` if `ch` is a control character (general category `Cc`).
///
/// Control characters frequently map to `.notdef` or an empty glyph in every font, so
/// they are never treated as needing a fallback font.
pub fn is_control(ch: char) -> bool {
    get_general_category(ch) == GeneralCategory::Control
}
