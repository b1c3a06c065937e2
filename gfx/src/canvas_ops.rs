use wheelspin_abi::damage::DamageRect;
use wheelspin_abi::draw::{Canvas, EncodedPixel};

use crate::normalize_angle;

#[inline]
fn clipped<T: Canvas>(target: &T, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<DamageRect> {
    let rect = DamageRect { x0, y0, x1, y1 }.clip(target.width() as i32, target.height() as i32);
    if rect.is_valid() { Some(rect) } else { None }
}

pub fn line<T: Canvas>(
    target: &mut T,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    px: EncodedPixel,
) -> Option<DamageRect> {
    let w = target.width() as i32;
    let h = target.height() as i32;

    if (x0 < 0 && x1 < 0) || (y0 < 0 && y1 < 0) || (x0 >= w && x1 >= w) || (y0 >= h && y1 >= h) {
        return None;
    }

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut cx = x0;
    let mut cy = y0;

    loop {
        target.put_pixel(cx, cy, px);
        if cx == x1 && cy == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cx += sx;
        }
        if e2 <= dx {
            err += dx;
            cy += sy;
        }
    }

    clipped(target, x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// Line with a stroke width, drawn as a filled quad.
///
/// Widths at or below one pixel fall back to [`line`].
pub fn thick_line<T: Canvas>(
    target: &mut T,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    width: f64,
    px: EncodedPixel,
) -> Option<DamageRect> {
    let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
    if width <= 1.0 || len < f64::EPSILON {
        return line(
            target,
            x0.round() as i32,
            y0.round() as i32,
            x1.round() as i32,
            y1.round() as i32,
            px,
        );
    }

    let half = width / 2.0;
    let nx = -(y1 - y0) / len * half;
    let ny = (x1 - x0) / len * half;

    let ax = (x0 + nx).round() as i32;
    let ay = (y0 + ny).round() as i32;
    let bx = (x1 + nx).round() as i32;
    let by = (y1 + ny).round() as i32;
    let cx = (x1 - nx).round() as i32;
    let cy = (y1 - ny).round() as i32;
    let dx = (x0 - nx).round() as i32;
    let dy = (y0 - ny).round() as i32;

    let first = triangle_filled(target, ax, ay, bx, by, cx, cy, px);
    let second = triangle_filled(target, ax, ay, cx, cy, dx, dy, px);
    match (first, second) {
        (Some(a), Some(b)) => Some(a.union(&b)),
        (a, b) => a.or(b),
    }
}

pub fn rect<T: Canvas>(
    target: &mut T,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    px: EncodedPixel,
) -> Option<DamageRect> {
    if w <= 0 || h <= 0 {
        return None;
    }
    target.hline(x, x + w - 1, y, px);
    target.hline(x, x + w - 1, y + h - 1, px);
    target.vline(x, y, y + h - 1, px);
    target.vline(x + w - 1, y, y + h - 1, px);

    clipped(target, x, y, x + w - 1, y + h - 1)
}

pub fn fill_rect<T: Canvas>(
    target: &mut T,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    px: EncodedPixel,
) -> Option<DamageRect> {
    if w <= 0 || h <= 0 {
        return None;
    }
    target.fill_rect_encoded(x, y, w, h, px);

    clipped(target, x, y, x + w - 1, y + h - 1)
}

pub fn circle_filled<T: Canvas>(
    target: &mut T,
    cx: i32,
    cy: i32,
    radius: i32,
    px: EncodedPixel,
) -> Option<DamageRect> {
    if radius <= 0 {
        return None;
    }

    let mut x = 0i32;
    let mut y = radius;
    let mut d = 1 - radius;

    target.hline(cx - radius, cx + radius, cy, px);

    while x < y {
        x += 1;
        if d < 0 {
            d += 2 * x + 1;
        } else {
            target.hline(cx - x + 1, cx + x - 1, cy + y, px);
            target.hline(cx - x + 1, cx + x - 1, cy - y, px);
            y -= 1;
            d += 2 * (x - y) + 1;
        }

        target.hline(cx - y, cx + y, cy + x, px);
        target.hline(cx - y, cx + y, cy - x, px);
    }

    clipped(target, cx - radius, cy - radius, cx + radius, cy + radius)
}

#[inline]
fn span_half_width(radius: i32, dy: i32) -> i32 {
    let r = radius as f64 + 0.5;
    let d = dy as f64;
    if d.abs() > r {
        return -1;
    }
    (r * r - d * d).sqrt().floor() as i32
}

/// Annulus between `inner` and `outer` radius (both inclusive of the band).
///
/// Used for wheel rims and hub rings.
pub fn ring<T: Canvas>(
    target: &mut T,
    cx: i32,
    cy: i32,
    outer: i32,
    inner: i32,
    px: EncodedPixel,
) -> Option<DamageRect> {
    if outer <= 0 || inner >= outer {
        return None;
    }
    let inner = inner.max(0);

    for dy in -outer..=outer {
        let xo = span_half_width(outer, dy);
        if xo < 0 {
            continue;
        }
        let xi = if inner > 0 { span_half_width(inner - 1, dy) } else { -1 };
        if xi < 0 {
            target.hline(cx - xo, cx + xo, cy + dy, px);
        } else {
            target.hline(cx - xo, cx - xi - 1, cy + dy, px);
            target.hline(cx + xi + 1, cx + xo, cy + dy, px);
        }
    }

    clipped(target, cx - outer, cy - outer, cx + outer, cy + outer)
}

pub fn triangle_filled<T: Canvas>(
    target: &mut T,
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    mut x2: i32,
    mut y2: i32,
    px: EncodedPixel,
) -> Option<DamageRect> {
    if y0 > y1 {
        core::mem::swap(&mut y0, &mut y1);
        core::mem::swap(&mut x0, &mut x1);
    }
    if y1 > y2 {
        core::mem::swap(&mut y1, &mut y2);
        core::mem::swap(&mut x1, &mut x2);
    }
    if y0 > y1 {
        core::mem::swap(&mut y0, &mut y1);
        core::mem::swap(&mut x0, &mut x1);
    }

    let total_height = y2 - y0;
    if total_height == 0 {
        let lo = x0.min(x1).min(x2);
        let hi = x0.max(x1).max(x2);
        target.hline(lo, hi, y0, px);
        return clipped(target, lo, y0, hi, y0);
    }

    for y in y0..=y2 {
        let second_half = y > y1 || y1 == y0;
        let segment_height = if second_half { y2 - y1 } else { y1 - y0 };
        if segment_height == 0 {
            continue;
        }

        let dy = y - if second_half { y1 } else { y0 };
        let alpha = ((y - y0) as i64 * 65536) / total_height as i64;
        let beta = (dy as i64 * 65536) / segment_height as i64;

        let ax = x0 + (((x2 - x0) as i64 * alpha) >> 16) as i32;
        let bx = if second_half {
            x1 + (((x2 - x1) as i64 * beta) >> 16) as i32
        } else {
            x0 + (((x1 - x0) as i64 * beta) >> 16) as i32
        };

        let (xa, xb) = if ax < bx { (ax, bx) } else { (bx, ax) };
        target.hline(xa, xb, y, px);
    }

    clipped(
        target,
        x0.min(x1).min(x2),
        y0,
        x0.max(x1).max(x2),
        y2,
    )
}

/// Fill a disc split into angular sectors.
///
/// `ends[i]` is the wheel-local end angle of sector `i` (ascending, the last
/// one `2π`), `pixels[i]` its color. Screen angles follow the raster
/// convention: 0 at 3 o'clock, increasing clockwise. A pixel at screen angle
/// `a` belongs to the sector covering `a - rotation`.
///
/// Each pixel is classified exactly once, so sectors never overlap or leave
/// gaps; zero-width sectors own no pixels.
pub fn fill_sectors<T: Canvas>(
    target: &mut T,
    cx: f64,
    cy: f64,
    radius: f64,
    rotation: f64,
    ends: &[f64],
    pixels: &[EncodedPixel],
) -> Option<DamageRect> {
    if radius <= 0.0 || ends.is_empty() || ends.len() != pixels.len() {
        return None;
    }
    let last = ends.len() - 1;
    let r2 = radius * radius;
    let top = (cy - radius).floor() as i32;
    let bottom = (cy + radius).ceil() as i32;

    for y in top..=bottom {
        let dy = y as f64 + 0.5 - cy;
        if dy * dy > r2 {
            continue;
        }
        let half = (r2 - dy * dy).sqrt();
        let x_start = (cx - half - 0.5).ceil() as i32;
        let x_end = (cx + half - 0.5).floor() as i32;
        if x_start > x_end {
            continue;
        }

        let mut run_start = x_start;
        let mut run_px: Option<EncodedPixel> = None;
        for x in x_start..=x_end {
            let dx = x as f64 + 0.5 - cx;
            let local = normalize_angle(dy.atan2(dx) - rotation);
            let idx = ends.partition_point(|&end| end <= local).min(last);
            let here = pixels[idx];
            match run_px {
                Some(prev) if prev == here => {}
                Some(prev) => {
                    target.hline(run_start, x - 1, y, prev);
                    run_start = x;
                    run_px = Some(here);
                }
                None => {
                    run_start = x;
                    run_px = Some(here);
                }
            }
        }
        if let Some(prev) = run_px {
            target.hline(run_start, x_end, y, prev);
        }
    }

    clipped(
        target,
        (cx - radius).floor() as i32,
        top,
        (cx + radius).ceil() as i32,
        bottom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DrawBuffer;
    use core::f64::consts::{PI, TAU};

    const BG: EncodedPixel = EncodedPixel::from_index(0);
    const A: EncodedPixel = EncodedPixel::from_index(1);
    const B: EncodedPixel = EncodedPixel::from_index(2);

    fn count(buf: &DrawBuffer, px: EncodedPixel) -> usize {
        buf.data().iter().filter(|&&b| b == px.index()).count()
    }

    #[test]
    fn line_endpoints_are_drawn() {
        let mut buf = DrawBuffer::new(16, 16).unwrap();
        let damage = line(&mut buf, 1, 2, 10, 7, A).unwrap();
        assert_eq!(buf.get_pixel(1, 2), Some(A));
        assert_eq!(buf.get_pixel(10, 7), Some(A));
        assert_eq!(damage, DamageRect { x0: 1, y0: 2, x1: 10, y1: 7 });
    }

    #[test]
    fn fully_offscreen_line_is_skipped() {
        let mut buf = DrawBuffer::new(8, 8).unwrap();
        assert!(line(&mut buf, -5, -5, -1, -2, A).is_none());
        assert_eq!(count(&buf, A), 0);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut buf = DrawBuffer::new(8, 8).unwrap();
        let damage = fill_rect(&mut buf, 6, 6, 10, 10, A).unwrap();
        assert_eq!(damage, DamageRect { x0: 6, y0: 6, x1: 7, y1: 7 });
        assert_eq!(count(&buf, A), 4);
    }

    #[test]
    fn ring_leaves_center_untouched() {
        let mut buf = DrawBuffer::new(41, 41).unwrap();
        ring(&mut buf, 20, 20, 18, 12, A);
        assert_eq!(buf.get_pixel(20, 20), Some(BG));
        assert_eq!(buf.get_pixel(20, 20 - 15), Some(A));
        assert_eq!(buf.get_pixel(20 + 15, 20), Some(A));
        assert_eq!(buf.get_pixel(0, 0), Some(BG));
    }

    #[test]
    fn thick_line_covers_its_width() {
        let mut buf = DrawBuffer::new(32, 32).unwrap();
        thick_line(&mut buf, 4.0, 16.0, 28.0, 16.0, 5.0, A);
        for y in 15..=17 {
            assert_eq!(buf.get_pixel(16, y), Some(A), "row {y}");
        }
        assert_eq!(buf.get_pixel(16, 24), Some(BG));
    }

    #[test]
    fn sectors_split_disc_by_angle() {
        let mut buf = DrawBuffer::new(64, 64).unwrap();
        // Sector 0 covers local [0, π) (the lower half on screen), sector 1 the rest.
        fill_sectors(&mut buf, 32.0, 32.0, 30.0, 0.0, &[PI, TAU], &[A, B]);
        assert_eq!(buf.get_pixel(32, 50), Some(A));
        assert_eq!(buf.get_pixel(32, 12), Some(B));
        assert_eq!(buf.get_pixel(0, 0), Some(BG));
        let a = count(&buf, A) as i64;
        let b = count(&buf, B) as i64;
        assert!((a - b).abs() <= 64, "halves differ too much: {a} vs {b}");
    }

    #[test]
    fn rotation_moves_sectors() {
        let mut buf = DrawBuffer::new(64, 64).unwrap();
        fill_sectors(&mut buf, 32.0, 32.0, 30.0, PI, &[PI, TAU], &[A, B]);
        assert_eq!(buf.get_pixel(32, 50), Some(B));
        assert_eq!(buf.get_pixel(32, 12), Some(A));
    }

    #[test]
    fn zero_width_sector_owns_no_pixels() {
        let mut buf = DrawBuffer::new(48, 48).unwrap();
        let c = EncodedPixel::from_index(3);
        fill_sectors(&mut buf, 24.0, 24.0, 20.0, 0.0, &[PI, PI, TAU], &[A, c, B]);
        assert_eq!(count(&buf, c), 0);
        assert!(count(&buf, A) > 0);
        assert!(count(&buf, B) > 0);
    }
}
