//! Error types

use std::fmt;

/// Error returned from shaping collection operations
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ShapingError {
    /// An index at or beyond the number of slots in the collection.
    IndexOutOfRange(usize),
    /// A second slot for a codepoint offset that already has one.
    DuplicateOffset(usize),
    Parse(ParseError),
}

impl From<ParseError> for ShapingError {
    fn from(error: ParseError) -> Self {
        ShapingError::Parse(error)
    }
}

impl fmt::Display for ShapingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapingError::IndexOutOfRange(index) => {
                write!(f, "glyph index {} is out of range", index)
            }
            ShapingError::DuplicateOffset(offset) => {
                write!(f, "codepoint offset {} already has a glyph", offset)
            }
            ShapingError::Parse(err) => write!(f, "shaping parse: {}", err),
        }
    }
}

impl std::error::Error for ShapingError {}

/// Errors that originate when interpreting caller supplied values
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadValue,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadValue => write!(f, "invalid value"),
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ShapingError::IndexOutOfRange(7).to_string(),
            "glyph index 7 is out of range"
        );
        assert_eq!(
            ShapingError::DuplicateOffset(3).to_string(),
            "codepoint offset 3 already has a glyph"
        );
        assert_eq!(
            ShapingError::from(ParseError::BadValue).to_string(),
            "shaping parse: invalid value"
        );
    }
}
