//! Wheelspin shared drawing types
//!
//! This crate provides the canonical definitions for the types shared between
//! the rasterizer (`wheelspin-gfx`) and the wheel pipeline
//! (`wheelspin-video`): colors, encoded pixels, the `Canvas` surface trait,
//! damage rectangles and the bitmap font.

#![no_std]
#![forbid(unsafe_code)]

pub mod damage;
pub mod draw;
pub mod font;

pub use damage::DamageRect;
pub use draw::{Canvas, Color32, EncodedPixel};
pub use font::{FONT_CHAR_HEIGHT, FONT_CHAR_WIDTH, Glyph};
