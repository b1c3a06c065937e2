//! Scaled and rotated bitmap text.
//!
//! Glyphs are sampled nearest-neighbour at pixel centres, so text at any
//! scale or angle only ever writes the single encoded pixel it was given.
//! There is no anti-aliasing and therefore no blended color.

use wheelspin_abi::damage::DamageRect;
use wheelspin_abi::draw::{Canvas, EncodedPixel};
use wheelspin_abi::font::{
    FONT_CHAR_HEIGHT, FONT_CHAR_WIDTH, REPLACEMENT_CHAR, get_glyph_or_space, glyph_bit,
};

pub const ELLIPSIS: &str = "...";

/// Map text to the byte stream the bitmap font understands.
///
/// One byte per `char`, so width math stays in characters rather than UTF-8
/// bytes; anything outside ASCII becomes the replacement glyph.
pub fn glyph_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| if ch.is_ascii() { ch as u8 } else { REPLACEMENT_CHAR })
        .collect()
}

#[inline]
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Rendered width in pixels at `scale`.
#[inline]
pub fn str_width(text: &str, scale: f64) -> f64 {
    char_count(text) as f64 * FONT_CHAR_WIDTH as f64 * scale
}

/// Rendered line height in pixels at `scale`.
#[inline]
pub fn line_height(scale: f64) -> f64 {
    FONT_CHAR_HEIGHT as f64 * scale
}

/// Largest scale in `[min_scale, preferred]` at which `text` fits a
/// `max_width` x `max_height` box, or `None` if it does not fit even at
/// `min_scale`.
pub fn fit_scale(
    text: &str,
    max_width: f64,
    max_height: f64,
    preferred: f64,
    min_scale: f64,
) -> Option<f64> {
    let chars = char_count(text);
    if chars == 0 || max_width <= 0.0 || max_height <= 0.0 {
        return None;
    }
    let by_width = max_width / (chars as f64 * FONT_CHAR_WIDTH as f64);
    let by_height = max_height / FONT_CHAR_HEIGHT as f64;
    let scale = preferred.min(by_width).min(by_height);
    if scale + 1e-9 < min_scale { None } else { Some(scale.max(min_scale)) }
}

/// Cut `text` so it fits `max_width` at `scale`, ending in [`ELLIPSIS`].
///
/// Returns the text unchanged if it already fits and `None` if not even the
/// ellipsis fits.
pub fn truncate_to_width(text: &str, max_width: f64, scale: f64) -> Option<String> {
    let per_char = FONT_CHAR_WIDTH as f64 * scale;
    if per_char <= 0.0 {
        return None;
    }
    let max_chars = (max_width / per_char + 1e-9).floor() as usize;
    let chars = char_count(text);
    if chars <= max_chars {
        return Some(text.to_owned());
    }
    let ellipsis = char_count(ELLIPSIS);
    if max_chars < ellipsis {
        return None;
    }
    let mut out: String = text.chars().take(max_chars - ellipsis).collect();
    out.push_str(ELLIPSIS);
    Some(out)
}

/// Core text rasterizer.
///
/// `(origin_x, origin_y)` is where the top-left corner of the text box lands.
/// The baseline advances along `angle` (radians, screen convention) and rows
/// grow along the perpendicular.
pub fn draw_text_transformed<T: Canvas>(
    target: &mut T,
    origin_x: f64,
    origin_y: f64,
    angle: f64,
    text: &str,
    scale: f64,
    px: EncodedPixel,
) -> Option<DamageRect> {
    let bytes = glyph_bytes(text);
    if bytes.is_empty() || scale <= 0.0 {
        return None;
    }

    let cell_w = FONT_CHAR_WIDTH as f64 * scale;
    let box_w = bytes.len() as f64 * cell_w;
    let box_h = FONT_CHAR_HEIGHT as f64 * scale;
    let (sin, cos) = angle.sin_cos();
    // baseline direction (cos, sin); "down" direction (-sin, cos)
    let corners = [
        (origin_x, origin_y),
        (origin_x + box_w * cos, origin_y + box_w * sin),
        (origin_x - box_h * sin, origin_y + box_h * cos),
        (
            origin_x + box_w * cos - box_h * sin,
            origin_y + box_w * sin + box_h * cos,
        ),
    ];
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor() as i32;
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil() as i32;
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor() as i32;
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i32;

    let buf_w = target.width() as i32;
    let buf_h = target.height() as i32;
    let mut damage = DamageRect::invalid();

    for y in min_y.max(0)..=max_y.min(buf_h - 1) {
        for x in min_x.max(0)..=max_x.min(buf_w - 1) {
            let dx = x as f64 + 0.5 - origin_x;
            let dy = y as f64 + 0.5 - origin_y;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            if u < 0.0 || v < 0.0 || u >= box_w || v >= box_h {
                continue;
            }
            let cell = (u / cell_w) as usize;
            let Some(&ch) = bytes.get(cell) else {
                continue;
            };
            let col = ((u - cell as f64 * cell_w) / scale) as i32;
            let row = (v / scale) as i32;
            if glyph_bit(&get_glyph_or_space(ch), col, row) {
                target.put_pixel(x, y, px);
                damage.include_point(x, y);
            }
        }
    }

    if damage.is_valid() { Some(damage) } else { None }
}

/// Axis-aligned text with its top-left corner at `(x, y)`.
#[inline]
pub fn draw_str<T: Canvas>(
    target: &mut T,
    x: i32,
    y: i32,
    text: &str,
    scale: f64,
    px: EncodedPixel,
) -> Option<DamageRect> {
    draw_text_transformed(target, x as f64, y as f64, 0.0, text, scale, px)
}

/// Axis-aligned text centred on `(cx, cy)`.
pub fn draw_str_centered<T: Canvas>(
    target: &mut T,
    cx: f64,
    cy: f64,
    text: &str,
    scale: f64,
    px: EncodedPixel,
) -> Option<DamageRect> {
    let w = str_width(text, scale);
    let h = line_height(scale);
    draw_text_transformed(
        target,
        (cx - w / 2.0).round(),
        (cy - h / 2.0).round(),
        0.0,
        text,
        scale,
        px,
    )
}

/// Text whose baseline runs along `angle`, vertically centred on the ray
/// through `(anchor_x, anchor_y)`. The text starts `offset` pixels along
/// the ray.
pub fn draw_str_along<T: Canvas>(
    target: &mut T,
    anchor_x: f64,
    anchor_y: f64,
    angle: f64,
    offset: f64,
    text: &str,
    scale: f64,
    px: EncodedPixel,
) -> Option<DamageRect> {
    let (sin, cos) = angle.sin_cos();
    let half_h = line_height(scale) / 2.0;
    let origin_x = anchor_x + offset * cos + half_h * sin;
    let origin_y = anchor_y + offset * sin - half_h * cos;
    draw_text_transformed(target, origin_x, origin_y, angle, text, scale, px)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrawBuffer;
    use core::f64::consts::FRAC_PI_2;

    const INK: EncodedPixel = EncodedPixel::from_index(7);

    fn ink_count(buf: &DrawBuffer) -> usize {
        buf.data().iter().filter(|&&b| b == INK.index()).count()
    }

    #[test]
    fn width_counts_chars_not_bytes() {
        assert_eq!(str_width("abc", 1.0), 24.0);
        assert_eq!(str_width("é", 2.0), 16.0);
        assert_eq!(glyph_bytes("aé"), vec![b'a', REPLACEMENT_CHAR]);
    }

    #[test]
    fn fit_scale_shrinks_to_width() {
        let s = fit_scale("abcd", 32.0, 100.0, 3.0, 0.5).unwrap();
        assert!((s - 1.0).abs() < 1e-12);
        assert_eq!(fit_scale("abcd", 100.0, 100.0, 2.0, 0.5), Some(2.0));
        assert_eq!(fit_scale("abcd", 8.0, 100.0, 2.0, 1.0), None);
        assert_eq!(fit_scale("", 8.0, 100.0, 2.0, 1.0), None);
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("short", 80.0, 1.0).as_deref(), Some("short"));
        assert_eq!(
            truncate_to_width("averyveryverylongname", 64.0, 1.0).as_deref(),
            Some("avery...")
        );
        assert_eq!(truncate_to_width("name", 16.0, 1.0), None);
    }

    #[test]
    fn scaled_text_doubles_ink() {
        let mut small = DrawBuffer::new(64, 32).unwrap();
        let mut big = DrawBuffer::new(64, 32).unwrap();
        draw_str(&mut small, 0, 0, "H", 1.0, INK);
        draw_str(&mut big, 0, 0, "H", 2.0, INK);
        assert_eq!(ink_count(&big), 4 * ink_count(&small));
    }

    #[test]
    fn quarter_turn_keeps_ink() {
        let mut flat = DrawBuffer::new(64, 64).unwrap();
        let mut turned = DrawBuffer::new(64, 64).unwrap();
        draw_str(&mut flat, 8, 8, "WX", 2.0, INK);
        draw_text_transformed(&mut turned, 40.0, 8.0, FRAC_PI_2, "WX", 2.0, INK);
        assert_eq!(ink_count(&flat), ink_count(&turned));
    }

    #[test]
    fn text_is_clipped_not_wrapped() {
        let mut buf = DrawBuffer::new(16, 8).unwrap();
        let damage = draw_str(&mut buf, 10, 0, "MMMM", 1.0, INK).unwrap();
        assert!(damage.x1 <= 15);
        assert!(damage.x0 >= 10);
    }
}
