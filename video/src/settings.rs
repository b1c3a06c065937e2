//! Render settings and the size tiers they come from.
//!
//! Settings are picked once, before anything is rendered, from the
//! participant count. Larger wheels get a smaller canvas, fewer frames,
//! a longer frame delay and fewer segment colors so the finished animation
//! stays small enough to upload.

use crate::error::{SpinError, SpinResult};
use crate::palette::MAX_SEGMENT_COLORS;

pub const TIER_HIGH_MAX_PARTICIPANTS: usize = 15;
pub const TIER_MEDIUM_MAX_PARTICIPANTS: usize = 30;
/// Entry counts are drawn on labels only up to this many participants.
pub const ENTRY_COUNT_MAX_PARTICIPANTS: usize = 25;

const MIN_CANVAS: u32 = 64;
const MAX_CANVAS: u32 = 2048;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Tier {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Tier::High),
            2 => Some(Tier::Medium),
            3 => Some(Tier::Low),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn for_participants(count: usize) -> Self {
        if count <= TIER_HIGH_MAX_PARTICIPANTS {
            Tier::High
        } else if count <= TIER_MEDIUM_MAX_PARTICIPANTS {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// Frames spent in each animation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseFrames {
    pub accelerate: usize,
    pub high_speed: usize,
    pub decelerate: usize,
    pub hold: usize,
    pub celebrate: usize,
}

impl PhaseFrames {
    pub const fn new(
        accelerate: usize,
        high_speed: usize,
        decelerate: usize,
        hold: usize,
        celebrate: usize,
    ) -> Self {
        Self {
            accelerate,
            high_speed,
            decelerate,
            hold,
            celebrate,
        }
    }

    pub const fn total(&self) -> usize {
        self.accelerate + self.high_speed + self.decelerate + self.hold + self.celebrate
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub canvas_size: u32,
    pub wheel_radius: u32,
    pub hub_radius: u32,
    /// Hundredths of a second.
    pub frame_delay_cs: u16,
    pub segment_colors: usize,
    pub frames: PhaseFrames,
    pub label_scale: f64,
    pub show_entry_counts: bool,
    pub particle_count: usize,
}

impl RenderSettings {
    pub fn for_tier(tier: Tier, participant_count: usize) -> Self {
        let (canvas_size, frames, frame_delay_cs, segment_colors, label_scale, particle_count) =
            match tier {
                Tier::High => (480, PhaseFrames::new(15, 30, 45, 20, 30), 4, 12, 2.0, 48),
                Tier::Medium => (400, PhaseFrames::new(12, 24, 36, 16, 24), 5, 10, 1.5, 36),
                Tier::Low => (320, PhaseFrames::new(10, 18, 30, 12, 20), 6, 8, 1.0, 24),
            };
        Self {
            canvas_size,
            wheel_radius: canvas_size * 2 / 5,
            hub_radius: canvas_size / 11,
            frame_delay_cs,
            segment_colors,
            frames,
            label_scale,
            show_entry_counts: participant_count <= ENTRY_COUNT_MAX_PARTICIPANTS,
            particle_count,
        }
    }

    pub fn total_frames(&self) -> usize {
        self.frames.total()
    }

    /// Reject settings the renderer or encoder cannot honor.
    pub fn validate(&self) -> SpinResult {
        if !(MIN_CANVAS..=MAX_CANVAS).contains(&self.canvas_size) {
            return Err(SpinError::InvalidSettings(format!(
                "canvas size {} outside {}..={}",
                self.canvas_size, MIN_CANVAS, MAX_CANVAS
            )));
        }
        if self.wheel_radius == 0 || self.wheel_radius > self.canvas_size / 2 {
            return Err(SpinError::InvalidSettings(format!(
                "wheel radius {} does not fit a {} canvas",
                self.wheel_radius, self.canvas_size
            )));
        }
        if self.hub_radius >= self.wheel_radius {
            return Err(SpinError::InvalidSettings(
                "hub must be smaller than the wheel".into(),
            ));
        }
        if self.frame_delay_cs == 0 {
            return Err(SpinError::InvalidSettings("frame delay must be positive".into()));
        }
        if !(1..=MAX_SEGMENT_COLORS).contains(&self.segment_colors) {
            return Err(SpinError::InvalidSettings(format!(
                "segment colors must be 1..={}",
                MAX_SEGMENT_COLORS
            )));
        }
        if self.frames.decelerate < 2 {
            return Err(SpinError::InvalidSettings(
                "deceleration needs at least two frames".into(),
            ));
        }
        if !(self.label_scale.is_finite() && self.label_scale > 0.0) {
            return Err(SpinError::InvalidSettings("label scale must be positive".into()));
        }
        Ok(())
    }
}

/// How the caller wants quality chosen.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum QualityOverride {
    #[default]
    Auto,
    Tier(Tier),
    Custom(RenderSettings),
}

pub fn select_settings(
    participant_count: usize,
    quality: &QualityOverride,
) -> SpinResult<RenderSettings> {
    let settings = match quality {
        QualityOverride::Auto => {
            RenderSettings::for_tier(Tier::for_participants(participant_count), participant_count)
        }
        QualityOverride::Tier(tier) => RenderSettings::for_tier(*tier, participant_count),
        QualityOverride::Custom(custom) => *custom,
    };
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(Tier::for_participants(1), Tier::High);
        assert_eq!(Tier::for_participants(15), Tier::High);
        assert_eq!(Tier::for_participants(16), Tier::Medium);
        assert_eq!(Tier::for_participants(30), Tier::Medium);
        assert_eq!(Tier::for_participants(31), Tier::Low);
    }

    #[test]
    fn forty_participants_get_the_low_tier() {
        let s = select_settings(40, &QualityOverride::Auto).unwrap();
        assert_eq!(s.canvas_size, 320);
        assert_eq!(s.total_frames(), 90);
        assert_eq!(s.frame_delay_cs, 6);
        assert_eq!(s.segment_colors, 8);
        assert!(!s.show_entry_counts);
    }

    #[test]
    fn tier_frame_totals() {
        assert_eq!(RenderSettings::for_tier(Tier::High, 5).total_frames(), 140);
        assert_eq!(RenderSettings::for_tier(Tier::Medium, 20).total_frames(), 112);
        assert!(RenderSettings::for_tier(Tier::Medium, 25).show_entry_counts);
        assert!(!RenderSettings::for_tier(Tier::Medium, 26).show_entry_counts);
    }

    #[test]
    fn every_tier_validates() {
        for tier in [Tier::High, Tier::Medium, Tier::Low] {
            assert!(RenderSettings::for_tier(tier, 10).validate().is_ok());
        }
    }

    #[test]
    fn explicit_tier_wins_over_count() {
        let s = select_settings(3, &QualityOverride::Tier(Tier::Low)).unwrap();
        assert_eq!(s.canvas_size, 320);
    }

    #[test]
    fn bad_custom_settings_are_rejected() {
        let mut custom = RenderSettings::for_tier(Tier::High, 3);
        custom.frames.decelerate = 1;
        assert!(matches!(
            select_settings(3, &QualityOverride::Custom(custom)),
            Err(SpinError::InvalidSettings(_))
        ));

        let mut custom = RenderSettings::for_tier(Tier::High, 3);
        custom.wheel_radius = custom.canvas_size;
        assert!(select_settings(3, &QualityOverride::Custom(custom)).is_err());

        // Doubling this radius would wrap to zero.
        let mut custom = RenderSettings::for_tier(Tier::High, 3);
        custom.wheel_radius = u32::MAX / 2 + 1;
        assert!(matches!(
            select_settings(3, &QualityOverride::Custom(custom)),
            Err(SpinError::InvalidSettings(_))
        ));

        let mut custom = RenderSettings::for_tier(Tier::High, 3);
        custom.wheel_radius = custom.canvas_size / 2;
        assert!(select_settings(3, &QualityOverride::Custom(custom)).is_ok());
    }

    #[test]
    fn tier_numbers_round_trip() {
        for n in 1..=3 {
            assert_eq!(Tier::from_number(n).map(Tier::number), Some(n));
        }
        assert_eq!(Tier::from_number(4), None);
    }
}
