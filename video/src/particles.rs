//! Confetti for the celebrate phase.
//!
//! The field is generated once per spin. Positions are a pure function of
//! the frame offset, so a frame rendered twice comes out identical.

use rand::Rng;

use wheelspin_abi::draw::Canvas;
use wheelspin_gfx::canvas_ops;

use crate::palette::{FixedPalette, PARTICLE_COLORS, PaletteIntent};

/// Particles fall through this much of the canvas height before wrapping.
const FALL_SPAN: f64 = 1.2;
const REFERENCE_CANVAS: f64 = 480.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Start position as a fraction of the canvas.
    pub x: f64,
    pub y: f64,
    /// Drift per frame as a fraction of the canvas.
    pub vx: f64,
    pub vy: f64,
    pub size: i32,
    pub color: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                x: rng.random_range(0.0..1.0),
                y: rng.random_range(-0.2..0.4),
                vx: rng.random_range(-0.004..0.004),
                vy: rng.random_range(0.010..0.025),
                size: rng.random_range(2..=4),
                color: rng.random_range(0..PARTICLE_COLORS.len()),
            })
            .collect();
        Self { particles }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Pixel position of every particle `elapsed` frames into the effect.
    pub fn positions(
        &self,
        elapsed: usize,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = (i32, i32, &Particle)> + '_ {
        let t = elapsed as f64;
        self.particles.iter().map(move |p| {
            let fx = (p.x + p.vx * t).rem_euclid(1.0);
            let fy = (p.y + 0.2 + p.vy * t).rem_euclid(FALL_SPAN) - 0.2;
            (
                (fx * width as f64) as i32,
                (fy * height as f64) as i32,
                p,
            )
        })
    }

    pub fn draw<T: Canvas>(&self, target: &mut T, elapsed: usize, palette: &FixedPalette) {
        let width = target.width();
        let height = target.height();
        let scale = (width.min(height) as f64 / REFERENCE_CANVAS).max(0.5);
        for (x, y, p) in self.positions(elapsed, width, height) {
            let side = ((p.size as f64 * scale).round() as i32).max(1);
            canvas_ops::fill_rect(
                target,
                x,
                y,
                side,
                side,
                palette.pixel(PaletteIntent::Particle(p.color)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use wheelspin_gfx::DrawBuffer;

    #[test]
    fn same_seed_same_field() {
        let a = ParticleField::generate(20, &mut StdRng::seed_from_u64(1));
        let b = ParticleField::generate(20, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
    }

    #[test]
    fn drawing_is_repeatable_and_uses_particle_colors() {
        let palette = FixedPalette::new(12);
        let field = ParticleField::generate(30, &mut StdRng::seed_from_u64(9));
        let mut first = DrawBuffer::new(120, 120).unwrap();
        let mut second = DrawBuffer::new(120, 120).unwrap();
        field.draw(&mut first, 7, &palette);
        field.draw(&mut second, 7, &palette);
        assert_eq!(first, second);

        let hist = first.index_histogram();
        let allowed: Vec<usize> = (0..PARTICLE_COLORS.len())
            .map(|i| palette.index(PaletteIntent::Particle(i)) as usize)
            .chain([0])
            .collect();
        for (idx, &n) in hist.iter().enumerate() {
            if n > 0 {
                assert!(allowed.contains(&idx));
            }
        }
    }

    #[test]
    fn particles_move_between_frames() {
        let field = ParticleField::generate(5, &mut StdRng::seed_from_u64(2));
        let a: Vec<_> = field.positions(0, 480, 480).map(|(x, y, _)| (x, y)).collect();
        let b: Vec<_> = field.positions(10, 480, 480).map(|(x, y, _)| (x, y)).collect();
        assert_ne!(a, b);
    }
}
