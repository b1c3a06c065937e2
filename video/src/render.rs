//! Wheel frame rendering.
//!
//! One [`FrameRenderer`] owns one indexed surface for the whole spin. Each
//! frame starts from [`FrameRenderer::begin_frame`], which resets every bit
//! of draw state and clears the surface, so nothing leaks from one frame
//! into the next. Layers are drawn back to front:
//!
//! background, sectors and borders, labels, pointer, hub, then the winner
//! banner and confetti once the wheel has stopped.

use core::f64::consts::PI;

use bitflags::bitflags;

use wheelspin_abi::draw::{Canvas, EncodedPixel};
use wheelspin_gfx::canvas_font::{
    ELLIPSIS, draw_str_along, draw_str_centered, fit_scale, line_height, str_width,
    truncate_to_width,
};
use wheelspin_gfx::{DrawBuffer, canvas_ops, normalize_angle};

use crate::entries::{Participant, WeightedSegment};
use crate::error::{SpinError, SpinResult};
use crate::palette::{FixedPalette, PaletteIntent};
use crate::particles::ParticleField;
use crate::schedule::{AnimationPhase, RotationSchedule};
use crate::settings::RenderSettings;

/// Segments narrower than this (radians) get no label.
pub const MIN_LABEL_ANGLE: f64 = 0.12;
/// Segments at least this wide also show the entry count.
pub const ENTRY_COUNT_ANGLE: f64 = 0.35;
const MIN_TEXT_SCALE: f64 = 1.0;
const HUB_LINE_GAP: f64 = 2.0;
const HUB_MAX_LINES: usize = 4;

bitflags! {
    /// Layers drawn for a frame.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FrameLayers: u8 {
        const WHEEL     = 1 << 0;
        const LABELS    = 1 << 1;
        const POINTER   = 1 << 2;
        const HUB       = 1 << 3;
        /// Winner segment drawn in the highlight color.
        const HIGHLIGHT = 1 << 4;
        const BANNER    = 1 << 5;
        const PARTICLES = 1 << 6;

        const SPINNING = Self::WHEEL.bits() | Self::LABELS.bits() | Self::POINTER.bits() | Self::HUB.bits();
        const RESULT = Self::SPINNING.bits() | Self::HIGHLIGHT.bits() | Self::BANNER.bits();
        const CELEBRATION = Self::RESULT.bits() | Self::PARTICLES.bits();
    }
}

impl FrameLayers {
    pub fn for_phase(phase: AnimationPhase) -> Self {
        match phase {
            AnimationPhase::Accelerate
            | AnimationPhase::HighSpeedSpin
            | AnimationPhase::Decelerate => FrameLayers::SPINNING,
            AnimationPhase::WinnerHold => FrameLayers::RESULT,
            AnimationPhase::Celebrate => FrameLayers::CELEBRATION,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Mutable drawing state, reset at the start of every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub fill: EncodedPixel,
    pub stroke: EncodedPixel,
    pub stroke_width: i32,
    pub text_scale: f64,
    pub align: TextAlign,
}

impl DrawState {
    pub fn initial(palette: &FixedPalette) -> Self {
        Self {
            fill: palette.pixel(PaletteIntent::Text),
            stroke: palette.pixel(PaletteIntent::Border),
            stroke_width: 1,
            text_scale: 1.0,
            align: TextAlign::Left,
        }
    }
}

/// Everything about a spin that stays fixed from frame to frame.
#[derive(Clone, Copy, Debug)]
pub struct WheelScene<'a> {
    pub participants: &'a [Participant],
    pub segments: &'a [WeightedSegment],
    pub giveaway_name: &'a str,
    /// Index into `segments`.
    pub winner_segment: usize,
    pub particles: &'a ParticleField,
}

impl WheelScene<'_> {
    fn participant_for(&self, segment: &WeightedSegment) -> Option<&Participant> {
        self.participants.get(segment.participant)
    }

    pub fn winner_name(&self) -> &str {
        self.segments
            .get(self.winner_segment)
            .and_then(|seg| self.participant_for(seg))
            .map(Participant::label)
            .unwrap_or("?")
    }
}

/// What changes from frame to frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
    pub index: usize,
    pub phase: AnimationPhase,
    pub rotation: f64,
    pub celebrate_elapsed: usize,
}

impl FrameState {
    pub fn from_schedule(schedule: &RotationSchedule, index: usize) -> Self {
        Self {
            index,
            phase: schedule.phase_at(index),
            rotation: schedule.rotation_at(index),
            celebrate_elapsed: schedule.celebrate_elapsed(index).unwrap_or(0),
        }
    }

    /// The stopped wheel with the winner under the pointer.
    pub fn result(rotation: f64) -> Self {
        Self {
            index: 0,
            phase: AnimationPhase::WinnerHold,
            rotation,
            celebrate_elapsed: 0,
        }
    }
}

struct WheelLayout {
    cx: f64,
    cy: f64,
    radius: f64,
    hub_radius: f64,
    rim_width: i32,
    divider_width: f64,
    pointer_half_width: f64,
    pointer_depth: f64,
    pointer_height: f64,
    label_gap: f64,
    label_margin: f64,
}

impl WheelLayout {
    fn new(settings: &RenderSettings) -> Self {
        let size = settings.canvas_size as f64;
        let radius = settings.wheel_radius as f64;
        let rim_width = (settings.canvas_size / 160).max(2) as i32;
        let slack = (size / 2.0 - radius - rim_width as f64).max(0.0);
        Self {
            cx: size / 2.0,
            cy: size / 2.0 + slack * 0.2,
            radius,
            hub_radius: settings.hub_radius as f64,
            rim_width,
            divider_width: (size / 240.0).max(1.0),
            pointer_half_width: (size / 30.0).max(4.0),
            pointer_depth: (size / 40.0).max(3.0),
            pointer_height: (size / 16.0).max(6.0),
            label_gap: size * 0.02,
            label_margin: size * 0.025,
        }
    }
}

/// Cut `text` to `max_chars` characters, ending in an ellipsis.
fn ellipsize(text: &str, max_chars: usize) -> String {
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut cut: String = text.chars().take(keep).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str(ELLIPSIS);
    cut.chars().take(max_chars).collect()
}

/// Greedy word wrap for the hub caption.
///
/// A word longer than a line gets a line of its own, cut short with an
/// ellipsis. When the text needs more than `max_lines`, the last kept line
/// ends in an ellipsis.
pub fn wrap_hub_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if current_len > 0 {
                lines.push(core::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(ellipsize(word, max_chars));
        } else if current_len == 0 {
            current = word.to_owned();
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(core::mem::replace(&mut current, word.to_owned()));
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            if !last.ends_with(ELLIPSIS) {
                *last = ellipsize(last, max_chars);
            }
        }
    }
    lines
}

/// Label text for a segment, with the entry count when asked for.
pub fn segment_label(participant: &Participant, with_count: bool) -> String {
    if with_count {
        format!("{} ({})", participant.label(), participant.entries)
    } else {
        participant.label().to_owned()
    }
}

pub struct FrameRenderer {
    surface: DrawBuffer,
    palette: FixedPalette,
    settings: RenderSettings,
    layout: WheelLayout,
    state: DrawState,
}

impl FrameRenderer {
    pub fn new(settings: &RenderSettings, palette: FixedPalette) -> SpinResult<Self> {
        settings.validate()?;
        let surface = DrawBuffer::new(settings.canvas_size, settings.canvas_size).ok_or_else(
            || SpinError::InvalidSettings(format!("cannot allocate {0}x{0}", settings.canvas_size)),
        )?;
        let state = DrawState::initial(&palette);
        Ok(Self {
            surface,
            layout: WheelLayout::new(settings),
            settings: *settings,
            palette,
            state,
        })
    }

    pub fn surface(&self) -> &DrawBuffer {
        &self.surface
    }

    pub fn palette(&self) -> &FixedPalette {
        &self.palette
    }

    pub fn draw_state(&self) -> &DrawState {
        &self.state
    }

    /// Reset draw state and clear to the background color.
    pub fn begin_frame(&mut self) {
        self.state = DrawState::initial(&self.palette);
        self.surface
            .clear_canvas(self.palette.pixel(PaletteIntent::Background));
    }

    pub fn render(&mut self, scene: &WheelScene<'_>, frame: &FrameState) -> SpinResult<&DrawBuffer> {
        if !frame.rotation.is_finite() {
            return Err(SpinError::RenderFrame {
                frame: frame.index,
                reason: format!("rotation {} is not finite", frame.rotation),
            });
        }
        if scene.segments.is_empty() {
            return Err(SpinError::RenderFrame {
                frame: frame.index,
                reason: "wheel has no segments".into(),
            });
        }
        if scene.winner_segment >= scene.segments.len() {
            return Err(SpinError::RenderFrame {
                frame: frame.index,
                reason: format!(
                    "winner segment {} out of {}",
                    scene.winner_segment,
                    scene.segments.len()
                ),
            });
        }

        let layers = FrameLayers::for_phase(frame.phase);
        let highlight = layers
            .contains(FrameLayers::HIGHLIGHT)
            .then_some(scene.winner_segment);
        let fills = self.segment_fills(scene.segments, highlight);

        self.begin_frame();
        if layers.contains(FrameLayers::WHEEL) {
            self.draw_wheel(scene.segments, &fills, frame.rotation);
        }
        if layers.contains(FrameLayers::LABELS) {
            self.draw_labels(scene, &fills, frame.rotation);
        }
        if layers.contains(FrameLayers::POINTER) {
            self.draw_pointer();
        }
        if layers.contains(FrameLayers::HUB) {
            self.draw_hub(scene.giveaway_name);
        }
        if layers.contains(FrameLayers::BANNER) {
            self.draw_banner(scene.winner_name());
        }
        if layers.contains(FrameLayers::PARTICLES) {
            scene
                .particles
                .draw(&mut self.surface, frame.celebrate_elapsed, &self.palette);
        }
        Ok(&self.surface)
    }

    fn segment_fills(
        &self,
        segments: &[WeightedSegment],
        highlight: Option<usize>,
    ) -> Vec<EncodedPixel> {
        segments
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                if Some(i) == highlight {
                    self.palette.pixel(PaletteIntent::WinnerHighlight)
                } else {
                    seg.color
                }
            })
            .collect()
    }

    fn draw_wheel(&mut self, segments: &[WeightedSegment], fills: &[EncodedPixel], rotation: f64) {
        let l = &self.layout;
        let (cx, cy, radius) = (l.cx, l.cy, l.radius);
        let ends: Vec<f64> = segments.iter().map(|s| s.end_angle).collect();
        canvas_ops::fill_sectors(&mut self.surface, cx, cy, radius, rotation, &ends, fills);

        let border = self.palette.pixel(PaletteIntent::Border);
        if segments.len() > 1 {
            for seg in segments.iter().filter(|s| s.width > 0.0) {
                let (sin, cos) = (seg.start_angle + rotation).sin_cos();
                canvas_ops::thick_line(
                    &mut self.surface,
                    cx,
                    cy,
                    cx + radius * cos,
                    cy + radius * sin,
                    l.divider_width,
                    border,
                );
            }
        }

        let r = radius.round() as i32;
        canvas_ops::ring(
            &mut self.surface,
            cx.round() as i32,
            cy.round() as i32,
            r + l.rim_width,
            r,
            border,
        );
    }

    fn draw_labels(&mut self, scene: &WheelScene<'_>, fills: &[EncodedPixel], rotation: f64) {
        let l = &self.layout;
        let (cx, cy) = (l.cx, l.cy);
        let inner = l.hub_radius + l.label_gap;
        let outer = l.radius - l.label_margin;
        let available = outer - inner;
        if available <= 0.0 {
            return;
        }
        let mid_radius = (inner + outer) / 2.0;

        for (seg, &fill) in scene.segments.iter().zip(fills) {
            if seg.width < MIN_LABEL_ANGLE {
                continue;
            }
            let Some(participant) = scene.participant_for(seg) else {
                continue;
            };
            let with_count = self.settings.show_entry_counts && seg.width >= ENTRY_COUNT_ANGLE;
            let text = segment_label(participant, with_count);

            let max_height = 2.0 * mid_radius * (seg.width.min(PI) / 2.0).sin() * 0.85;
            let (text, scale) =
                match fit_scale(&text, available, max_height, self.settings.label_scale, MIN_TEXT_SCALE) {
                    Some(scale) => (text, scale),
                    None if line_height(MIN_TEXT_SCALE) <= max_height => {
                        match truncate_to_width(&text, available, MIN_TEXT_SCALE) {
                            Some(cut) => (cut, MIN_TEXT_SCALE),
                            None => continue,
                        }
                    }
                    None => continue,
                };

            let width = str_width(&text, scale);
            let offset = outer - width;
            let angle = normalize_angle(seg.mid_angle() + rotation);
            let ink = self.palette.contrast_text(fill);
            // Keep text upright on the left half of the wheel.
            if angle.cos() >= 0.0 {
                draw_str_along(&mut self.surface, cx, cy, angle, offset, &text, scale, ink);
            } else {
                draw_str_along(
                    &mut self.surface,
                    cx,
                    cy,
                    angle + PI,
                    -(offset + width),
                    &text,
                    scale,
                    ink,
                );
            }
        }
    }

    fn draw_pointer(&mut self) {
        let l = &self.layout;
        let cx = l.cx.round() as i32;
        let tip_y = (l.cy - l.radius + l.pointer_depth).round() as i32;
        let base_y = (l.cy - l.radius - l.pointer_height).round() as i32;
        let hw = l.pointer_half_width.round() as i32;

        canvas_ops::triangle_filled(
            &mut self.surface,
            cx,
            tip_y + 3,
            cx - hw - 3,
            base_y - 2,
            cx + hw + 3,
            base_y - 2,
            self.palette.pixel(PaletteIntent::PointerOutline),
        );
        canvas_ops::triangle_filled(
            &mut self.surface,
            cx,
            tip_y,
            cx - hw,
            base_y,
            cx + hw,
            base_y,
            self.palette.pixel(PaletteIntent::Pointer),
        );
    }

    fn draw_hub(&mut self, caption: &str) {
        let l = &self.layout;
        let (cx, cy) = (l.cx, l.cy);
        let hub = l.hub_radius.round() as i32;
        let ring = l.rim_width;
        canvas_ops::circle_filled(
            &mut self.surface,
            cx.round() as i32,
            cy.round() as i32,
            hub,
            self.palette.pixel(PaletteIntent::HubRing),
        );
        canvas_ops::circle_filled(
            &mut self.surface,
            cx.round() as i32,
            cy.round() as i32,
            hub - ring,
            self.palette.pixel(PaletteIntent::Hub),
        );

        // Square inscribed in the inner disc.
        let usable = (hub - ring).max(0) as f64 * core::f64::consts::SQRT_2;
        let scale = MIN_TEXT_SCALE;
        let per_char = str_width("M", scale);
        let pitch = line_height(scale) + HUB_LINE_GAP;
        let max_chars = (usable / per_char) as usize;
        let max_lines = ((usable / pitch) as usize).min(HUB_MAX_LINES);
        let lines = wrap_hub_text(caption, max_chars, max_lines);
        if lines.is_empty() {
            return;
        }

        self.state.fill = self.palette.pixel(PaletteIntent::Text);
        self.state.text_scale = scale;
        self.state.align = TextAlign::Center;
        let first = cy - pitch * (lines.len() - 1) as f64 / 2.0;
        for (i, line) in lines.iter().enumerate() {
            self.text(cx, first + pitch * i as f64, line);
        }
    }

    fn draw_banner(&mut self, winner: &str) {
        let size = self.settings.canvas_size as f64;
        let pad = (size / 60.0).max(3.0);
        let scale = self.settings.label_scale;
        let bw = size * 0.84;
        let bh = line_height(scale) + pad * 2.0;
        let x = ((size - bw) / 2.0).round();
        let y = (size - bh - size / 40.0).round();

        self.state.fill = self.palette.pixel(PaletteIntent::Banner);
        self.fill_rect(x as i32, y as i32, bw as i32, bh as i32);
        self.state.stroke = self.palette.pixel(PaletteIntent::BannerBorder);
        self.state.stroke_width = 2;
        self.stroke_rect(x as i32, y as i32, bw as i32, bh as i32);

        let text = format!("WINNER: {}", winner);
        let room_w = bw - pad * 2.0;
        let room_h = bh - pad;
        let (text, scale) = match fit_scale(&text, room_w, room_h, scale, MIN_TEXT_SCALE) {
            Some(s) => (text, s),
            None => match truncate_to_width(&text, room_w, MIN_TEXT_SCALE) {
                Some(cut) => (cut, MIN_TEXT_SCALE),
                None => return,
            },
        };
        self.state.fill = self.palette.pixel(PaletteIntent::Text);
        self.state.text_scale = scale;
        self.state.align = TextAlign::Center;
        self.text(size / 2.0, y + bh / 2.0, &text);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        canvas_ops::fill_rect(&mut self.surface, x, y, w, h, self.state.fill);
    }

    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        for i in 0..self.state.stroke_width {
            canvas_ops::rect(
                &mut self.surface,
                x + i,
                y + i,
                w - 2 * i,
                h - 2 * i,
                self.state.stroke,
            );
        }
    }

    /// Text vertically centred on `y`, placed horizontally by the current
    /// alignment.
    fn text(&mut self, x: f64, y: f64, text: &str) {
        let scale = self.state.text_scale;
        let px = self.state.fill;
        let w = str_width(text, scale);
        let cx = match self.state.align {
            TextAlign::Left => x + w / 2.0,
            TextAlign::Center => x,
            TextAlign::Right => x - w / 2.0,
        };
        draw_str_centered(&mut self.surface, cx, y, text, scale, px);
    }
}
