//! 8x8 bitmap glyphs for the printable ASCII range.
//!
//! Glyph rows come from the public-domain `font8x8` tables. Each row byte
//! stores the leftmost pixel in bit 0.

use font8x8::legacy::BASIC_LEGACY;

pub const FONT_CHAR_WIDTH: i32 = 8;
pub const FONT_CHAR_HEIGHT: i32 = 8;

/// Glyph used for bytes outside printable ASCII.
pub const REPLACEMENT_CHAR: u8 = b'?';

pub type Glyph = [u8; 8];

/// Look up the glyph for `ch`.
///
/// Control characters render as a space; bytes above 0x7E render as
/// [`REPLACEMENT_CHAR`].
#[inline]
pub fn get_glyph_or_space(ch: u8) -> Glyph {
    match ch {
        0x20..=0x7E => BASIC_LEGACY[ch as usize],
        0x00..=0x1F => BASIC_LEGACY[b' ' as usize],
        _ => BASIC_LEGACY[REPLACEMENT_CHAR as usize],
    }
}

/// Whether the glyph pixel at (`col`, `row`) is set.
#[inline]
pub fn glyph_bit(glyph: &Glyph, col: i32, row: i32) -> bool {
    if !(0..FONT_CHAR_WIDTH).contains(&col) || !(0..FONT_CHAR_HEIGHT).contains(&row) {
        return false;
    }
    glyph[row as usize] & (1 << col) != 0
}
