//! Participants and the wheel segments derived from them.

use core::f64::consts::TAU;

use wheelspin_abi::draw::EncodedPixel;
use wheelspin_gfx::normalize_angle;

use crate::palette::{FixedPalette, PaletteIntent};

/// One giveaway participant, as read from the snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub entries: u64,
    pub spend: f64,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, entries: u64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            entries,
            spend: 0.0,
        }
    }

    /// Name shown on the wheel; falls back to the id when blank.
    pub fn label(&self) -> &str {
        let name = self.display_name.trim();
        if name.is_empty() { &self.id } else { name }
    }
}

/// Angular slice of the wheel owned by one participant.
///
/// Angles are wheel-local radians, 0 at 3 o'clock, increasing clockwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedSegment {
    /// Index into the participant slice the segment was built from.
    pub participant: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub width: f64,
    pub color: EncodedPixel,
}

impl WeightedSegment {
    #[inline]
    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.width / 2.0
    }
}

pub fn total_entries(participants: &[Participant]) -> u64 {
    participants
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.entries))
}

/// Share of the total a participant holds, in `[0, 1]`.
pub fn win_chance(participant: &Participant, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        participant.entries as f64 / total as f64
    }
}

fn segments_from_bounds(
    participants: &[Participant],
    palette: &FixedPalette,
    bound: impl Fn(usize) -> f64,
) -> Vec<WeightedSegment> {
    let last = participants.len().saturating_sub(1);
    (0..participants.len())
        .map(|i| {
            let start_angle = bound(i);
            let end_angle = if i == last { TAU } else { bound(i + 1) };
            WeightedSegment {
                participant: i,
                start_angle,
                end_angle,
                width: end_angle - start_angle,
                color: palette.pixel(PaletteIntent::Segment(i)),
            }
        })
        .collect()
}

/// Proportional segments in input order.
///
/// Empty when there are no entries at all; the caller decides what a
/// zero-entry wheel means. Boundaries come from running entry totals, so the
/// widths add up to a full turn and the last segment ends exactly at `2π`.
pub fn build_segments(participants: &[Participant], palette: &FixedPalette) -> Vec<WeightedSegment> {
    let total = total_entries(participants);
    if total == 0 {
        return Vec::new();
    }
    let mut cumulative = Vec::with_capacity(participants.len());
    let mut running = 0u64;
    for p in participants {
        cumulative.push(running);
        running = running.saturating_add(p.entries);
    }
    segments_from_bounds(participants, palette, |i| {
        TAU * (cumulative[i] as f64 / total as f64)
    })
}

/// Segments to draw: proportional when anyone holds entries, otherwise one
/// equal slice per participant.
pub fn display_segments(
    participants: &[Participant],
    palette: &FixedPalette,
) -> Vec<WeightedSegment> {
    if total_entries(participants) > 0 {
        return build_segments(participants, palette);
    }
    let n = participants.len();
    segments_from_bounds(participants, palette, |i| TAU * i as f64 / n as f64)
}

/// Segment covering wheel-local `angle`. Zero-width segments are never hit.
pub fn segment_at_angle(segments: &[WeightedSegment], angle: f64) -> Option<usize> {
    if segments.is_empty() {
        return None;
    }
    let local = normalize_angle(angle);
    let idx = segments.partition_point(|s| s.end_angle <= local);
    Some(idx.min(segments.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people(weights: &[u64]) -> Vec<Participant> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Participant::new(format!("u{}", i), format!("User {}", i), w))
            .collect()
    }

    #[test]
    fn widths_sum_to_full_turn() {
        let palette = FixedPalette::new(12);
        let cases: [&[u64]; 4] = [&[1], &[3, 7], &[1, 1, 1], &[5, 0, 17, 2, 9, 1, 1, 1000]];
        for weights in cases {
            let segs = build_segments(&people(weights), &palette);
            let sum: f64 = segs.iter().map(|s| s.width).sum();
            assert!((sum - TAU).abs() < 1e-9);
            assert_eq!(segs.len(), weights.len());
            assert_eq!(segs.last().map(|s| s.end_angle), Some(TAU));
        }
    }

    #[test]
    fn order_follows_input() {
        let palette = FixedPalette::new(12);
        let segs = build_segments(&people(&[2, 4, 6]), &palette);
        for (i, seg) in segs.iter().enumerate() {
            assert_eq!(seg.participant, i);
        }
        assert!((segs[1].width - 2.0 * segs[0].width).abs() < 1e-12);
        assert!((segs[1].start_angle - segs[0].end_angle).abs() < 1e-12);
    }

    #[test]
    fn zero_total_gives_no_weighted_segments() {
        let palette = FixedPalette::new(12);
        assert!(build_segments(&people(&[0, 0]), &palette).is_empty());
        assert!(build_segments(&[], &palette).is_empty());

        let shown = display_segments(&people(&[0, 0, 0, 0]), &palette);
        assert_eq!(shown.len(), 4);
        assert!((shown[2].start_angle - core::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn colors_cycle_through_palette() {
        let palette = FixedPalette::new(8);
        let segs = build_segments(&people(&[1; 10]), &palette);
        assert_eq!(segs[0].color, segs[8].color);
        assert_ne!(segs[0].color, segs[1].color);
    }

    #[test]
    fn lookup_skips_zero_width() {
        let palette = FixedPalette::new(12);
        let segs = build_segments(&people(&[1, 0, 1]), &palette);
        assert_eq!(segment_at_angle(&segs, 0.1), Some(0));
        assert_eq!(segment_at_angle(&segs, core::f64::consts::PI), Some(2));
        assert_eq!(segment_at_angle(&segs, TAU + 0.1), Some(0));
        assert_eq!(segment_at_angle(&[], 1.0), None);
    }

    #[test]
    fn blank_display_name_uses_id() {
        let p = Participant::new("1234", "   ", 1);
        assert_eq!(p.label(), "1234");
        assert!((win_chance(&p, 4) - 0.25).abs() < 1e-12);
        assert_eq!(win_chance(&p, 0), 0.0);
    }
}
