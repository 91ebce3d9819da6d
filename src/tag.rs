//! Shaping feature tags.
//!
//! Tags are stored as big-endian packed `u32` values, the same representation used for
//! OpenType table and feature tags.

use crate::error::ParseError;
use std::fmt;

/// Generate a 4-byte feature tag from byte string
///
/// Example:
///
/// ```
/// use fontshape::tag;
///
/// assert_eq!(tag::LIGA, 0x6C696761);
/// ```
macro_rules! tag {
    ($w:expr) => {
        tag(*$w)
    };
}

#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DisplayTag(pub u32);

const fn tag(chars: [u8; 4]) -> u32 {
    ((chars[0] as u32) << 24) | ((chars[1] as u32) << 16) | ((chars[2] as u32) << 8) | (chars[3] as u32)
}

/// Parse a feature tag from a string of at most four printable ASCII characters.
///
/// Short tags are padded with spaces, so `"ss1"` becomes `"ss1 "`.
pub fn from_string(s: &str) -> Result<u32, ParseError> {
    if s.is_empty() || s.len() > 4 {
        return Err(ParseError::BadValue);
    }

    let mut bytes = [b' '; 4];
    for (byte, c) in bytes.iter_mut().zip(s.chars()) {
        if !c.is_ascii() || c.is_ascii_control() {
            return Err(ParseError::BadValue);
        }
        *byte = c as u8;
    }

    Ok(tag(bytes))
}

impl fmt::Display for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().any(|b| !b.is_ascii() || b.is_ascii_control()) {
            write!(f, "0x{:08x}", self.0)
        } else {
            bytes.iter().try_for_each(|&b| write!(f, "{}", char::from(b)))
        }
    }
}

impl fmt::Debug for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_string().fmt(f)
    }
}

pub const CALT: u32 = tag!(b"calt");
pub const CCMP: u32 = tag!(b"ccmp");
pub const CLIG: u32 = tag!(b"clig");
pub const CURS: u32 = tag!(b"curs");
pub const DIST: u32 = tag!(b"dist");
pub const KERN: u32 = tag!(b"kern");
pub const LIGA: u32 = tag!(b"liga");
pub const MARK: u32 = tag!(b"mark");
pub const MKMK: u32 = tag!(b"mkmk");
pub const RLIG: u32 = tag!(b"rlig");
pub const VERT: u32 = tag!(b"vert");
pub const VKRN: u32 = tag!(b"vkrn");
pub const VRT2: u32 = tag!(b"vrt2");
