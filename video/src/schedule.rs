//! Per-frame wheel rotation.
//!
//! Screen angle of a wheel-local angle `a` at rotation `θ` is `a + θ`, with
//! 0 at 3 o'clock and angles growing clockwise. The pointer sits at
//! 12 o'clock, [`POINTER_ANGLE`].
//!
//! The spin covers five phases. Rotation only depends on the frame index,
//! so any frame can be computed on its own:
//!
//! 1. accelerate: velocity eases in cubically from rest to the peak,
//! 2. high speed: peak velocity with one sinusoidal wobble,
//! 3. decelerate: cubic ease-out landing exactly on the target,
//! 4. hold: frozen on the target,
//! 5. celebrate: a slow constant creep.
//!
//! The peak velocity is solved from the target so the velocity is
//! continuous across the first three phase boundaries.

use core::f64::consts::{PI, TAU};

use rand::Rng;

use wheelspin_gfx::normalize_angle;

use crate::error::{SpinError, SpinResult};
use crate::settings::PhaseFrames;

/// Pointer direction: straight up.
pub const POINTER_ANGLE: f64 = 3.0 * PI / 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnimationPhase {
    Accelerate,
    HighSpeedSpin,
    Decelerate,
    WinnerHold,
    Celebrate,
}

/// Knobs for the feel of a spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinTuning {
    pub min_turns: u32,
    pub max_turns: u32,
    /// Relative velocity swing during the high-speed phase.
    pub wobble: f64,
    /// Radians per celebrate frame.
    pub celebrate_step: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            min_turns: 6,
            max_turns: 10,
            wobble: 0.05,
            celebrate_step: 0.008,
        }
    }
}

/// Rotation that puts wheel-local `mid_angle` under the pointer after
/// `turns` extra full revolutions.
pub fn target_rotation(mid_angle: f64, turns: u32) -> f64 {
    normalize_angle(POINTER_ANGLE - mid_angle) + turns as f64 * TAU
}

pub fn pick_turns<R: Rng + ?Sized>(tuning: &SpinTuning, rng: &mut R) -> u32 {
    let lo = tuning.min_turns.min(tuning.max_turns);
    let hi = tuning.min_turns.max(tuning.max_turns);
    rng.random_range(lo..=hi)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationSchedule {
    frames: PhaseFrames,
    tuning: SpinTuning,
    target: f64,
    peak_velocity: f64,
    accelerate_end: f64,
    high_speed_end: f64,
}

impl RotationSchedule {
    pub fn new(frames: PhaseFrames, target: f64, tuning: SpinTuning) -> SpinResult<Self> {
        if frames.decelerate < 2 {
            return Err(SpinError::InvalidSettings(
                "deceleration needs at least two frames".into(),
            ));
        }
        if !(target.is_finite() && target >= 0.0) {
            return Err(SpinError::InvalidSettings(format!(
                "bad target rotation {}",
                target
            )));
        }
        if !(0.0..1.0).contains(&tuning.wobble) {
            return Err(SpinError::InvalidSettings("wobble must be in [0, 1)".into()));
        }

        let n1 = frames.accelerate as f64;
        let n2 = frames.high_speed as f64;
        let l3 = (frames.decelerate - 1) as f64;
        let peak_velocity = target / (n1 / 4.0 + n2 + l3 / 3.0);
        let accelerate_end = peak_velocity * n1 / 4.0;
        let high_speed_end = accelerate_end + peak_velocity * n2;

        Ok(Self {
            frames,
            tuning,
            target,
            peak_velocity,
            accelerate_end,
            high_speed_end,
        })
    }

    /// Schedule landing the segment centred on `winner_mid` under the pointer.
    pub fn for_winner<R: Rng + ?Sized>(
        frames: PhaseFrames,
        winner_mid: f64,
        tuning: SpinTuning,
        rng: &mut R,
    ) -> SpinResult<Self> {
        let turns = pick_turns(&tuning, rng);
        Self::new(frames, target_rotation(winner_mid, turns), tuning)
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn peak_velocity(&self) -> f64 {
        self.peak_velocity
    }

    pub fn total_frames(&self) -> usize {
        self.frames.total()
    }

    /// Index of the last decelerate frame.
    pub fn landing_frame(&self) -> usize {
        self.frames.accelerate + self.frames.high_speed + self.frames.decelerate - 1
    }

    /// Frames past the end of the schedule count as celebrating.
    pub fn phase_at(&self, frame: usize) -> AnimationPhase {
        let f = &self.frames;
        let mut edge = f.accelerate;
        if frame < edge {
            return AnimationPhase::Accelerate;
        }
        edge += f.high_speed;
        if frame < edge {
            return AnimationPhase::HighSpeedSpin;
        }
        edge += f.decelerate;
        if frame < edge {
            return AnimationPhase::Decelerate;
        }
        edge += f.hold;
        if frame < edge {
            return AnimationPhase::WinnerHold;
        }
        AnimationPhase::Celebrate
    }

    /// Frames elapsed since the celebrate phase began, if it has.
    pub fn celebrate_elapsed(&self, frame: usize) -> Option<usize> {
        let start = self.landing_frame() + 1 + self.frames.hold;
        frame.checked_sub(start)
    }

    pub fn rotation_at(&self, frame: usize) -> f64 {
        let f = &self.frames;
        let v = self.peak_velocity;
        match self.phase_at(frame) {
            AnimationPhase::Accelerate => {
                let n1 = f.accelerate as f64;
                let p = frame as f64 / n1;
                v * n1 * p.powi(4) / 4.0
            }
            AnimationPhase::HighSpeedSpin => {
                let n2 = f.high_speed as f64;
                let j = (frame - f.accelerate) as f64;
                let wobble = self.tuning.wobble * n2 / TAU * (1.0 - (TAU * j / n2).cos());
                self.accelerate_end + v * (j + wobble)
            }
            AnimationPhase::Decelerate => {
                let k = frame - f.accelerate - f.high_speed;
                if k + 1 == f.decelerate {
                    return self.target;
                }
                let l3 = (f.decelerate - 1) as f64;
                let remaining = 1.0 - k as f64 / l3;
                let distance = self.target - self.high_speed_end;
                self.high_speed_end + distance * (1.0 - remaining.powi(3))
            }
            AnimationPhase::WinnerHold => self.target,
            AnimationPhase::Celebrate => {
                let c = self.celebrate_elapsed(frame).unwrap_or(0);
                self.target + self.tuning.celebrate_step * (c + 1) as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FRAMES: PhaseFrames = PhaseFrames::new(15, 30, 45, 20, 30);

    fn schedule(target: f64) -> RotationSchedule {
        RotationSchedule::new(FRAMES, target, SpinTuning::default()).unwrap()
    }

    #[test]
    fn phases_cover_every_frame_in_order() {
        let s = schedule(50.0);
        let mut last = AnimationPhase::Accelerate;
        let mut counts = [0usize; 5];
        for frame in 0..s.total_frames() {
            let phase = s.phase_at(frame);
            assert!(phase >= last);
            last = phase;
            counts[phase as usize] += 1;
        }
        assert_eq!(counts, [15, 30, 45, 20, 30]);
    }

    #[test]
    fn landing_frame_hits_target_exactly() {
        let s = schedule(47.123);
        assert_eq!(s.rotation_at(s.landing_frame()), 47.123);
        assert_eq!(s.phase_at(s.landing_frame()), AnimationPhase::Decelerate);
        assert_eq!(s.rotation_at(s.landing_frame() + 1), 47.123);
    }

    #[test]
    fn rotation_never_goes_backwards() {
        let s = schedule(60.0);
        let mut prev = s.rotation_at(0);
        assert_eq!(prev, 0.0);
        for frame in 1..s.total_frames() {
            let r = s.rotation_at(frame);
            assert!(r >= prev, "frame {} went from {} to {}", frame, prev, r);
            prev = r;
        }
    }

    #[test]
    fn velocity_is_continuous_at_phase_edges() {
        let s = schedule(60.0);
        let step = |f: usize| s.rotation_at(f + 1) - s.rotation_at(f);
        let v = s.peak_velocity();
        // accelerate -> high speed
        assert!((step(FRAMES.accelerate) - v).abs() / v < 0.05);
        // high speed -> decelerate
        let edge = FRAMES.accelerate + FRAMES.high_speed;
        assert!((step(edge - 1) - v).abs() / v < 0.1);
        assert!((step(edge) - v).abs() / v < 0.1);
    }

    #[test]
    fn celebrate_creeps_forward() {
        let s = schedule(30.0);
        let first = s.landing_frame() + 1 + FRAMES.hold;
        assert_eq!(s.phase_at(first), AnimationPhase::Celebrate);
        assert_eq!(s.celebrate_elapsed(first), Some(0));
        assert!((s.rotation_at(first) - (30.0 + 0.008)).abs() < 1e-12);
        assert!(s.rotation_at(first + 5) > s.rotation_at(first));
    }

    #[test]
    fn winner_mid_lands_under_pointer() {
        let mut rng = StdRng::seed_from_u64(3);
        for mid in [0.0, 0.4, PI, 5.5, 6.2] {
            let s = RotationSchedule::for_winner(FRAMES, mid, SpinTuning::default(), &mut rng)
                .unwrap();
            let screen = normalize_angle(mid + s.rotation_at(s.landing_frame()));
            assert!((screen - POINTER_ANGLE).abs() < 1e-9);
            let turns = (s.target() / TAU).floor();
            assert!((6.0..=10.0).contains(&turns));
        }
    }

    #[test]
    fn short_deceleration_is_rejected() {
        let frames = PhaseFrames::new(5, 5, 1, 5, 5);
        assert!(RotationSchedule::new(frames, 10.0, SpinTuning::default()).is_err());
    }
}
