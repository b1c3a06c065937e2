//! Closed color palette for wheel frames.
//!
//! Every pixel a frame contains is one of these entries. Drawing code asks
//! for a [`PaletteIntent`] and gets back the same palette index on every
//! frame of every spin built with the same segment color count, so the GIF
//! global color table never changes and colors cannot drift between frames.

use wheelspin_abi::draw::{Color32, EncodedPixel};

// Colors - dark wheel theme
pub const COLOR_BACKGROUND: Color32 = Color32::rgb(0x12, 0x14, 0x1C);
pub const COLOR_BORDER: Color32 = Color32::rgb(0xF2, 0xF2, 0xF2);
pub const COLOR_POINTER: Color32 = Color32::rgb(0xE8, 0x11, 0x23);
pub const COLOR_POINTER_OUTLINE: Color32 = Color32::rgb(0xFF, 0xFF, 0xFF);
pub const COLOR_HUB: Color32 = Color32::rgb(0x25, 0x25, 0x26);
pub const COLOR_HUB_RING: Color32 = Color32::rgb(0xC7, 0xC7, 0xC7);
pub const COLOR_TEXT: Color32 = Color32::rgb(0xFF, 0xFF, 0xFF);
pub const COLOR_TEXT_DARK: Color32 = Color32::rgb(0x10, 0x10, 0x10);
pub const COLOR_BANNER: Color32 = Color32::rgb(0x1A, 0x1A, 0x1C);
pub const COLOR_BANNER_BORDER: Color32 = Color32::rgb(0xFF, 0xD7, 0x00);
pub const COLOR_WINNER_HIGHLIGHT: Color32 = Color32::rgb(0xFF, 0xE0, 0x66);

pub const PARTICLE_COLORS: [Color32; 4] = [
    Color32::rgb(0xFF, 0x4F, 0x81),
    Color32::rgb(0x4F, 0xC3, 0xF7),
    Color32::rgb(0xB3, 0xFF, 0x59),
    Color32::rgb(0xFF, 0xB3, 0x00),
];

pub const SEGMENT_COLORS: [Color32; MAX_SEGMENT_COLORS] = [
    Color32::rgb(0xE5, 0x39, 0x35),
    Color32::rgb(0x1E, 0x88, 0xE5),
    Color32::rgb(0x43, 0xA0, 0x47),
    Color32::rgb(0xFB, 0x8C, 0x00),
    Color32::rgb(0x8E, 0x24, 0xAA),
    Color32::rgb(0x00, 0xAC, 0xC1),
    Color32::rgb(0xD8, 0x1B, 0x60),
    Color32::rgb(0x7C, 0xB3, 0x42),
    Color32::rgb(0x3F, 0x51, 0xB5),
    Color32::rgb(0xF4, 0x51, 0x1E),
    Color32::rgb(0x00, 0x89, 0x7B),
    Color32::rgb(0x6D, 0x4C, 0x41),
];

pub const MAX_SEGMENT_COLORS: usize = 12;

const FIXED_ENTRIES: usize = 11;
const SEGMENT_BASE: usize = FIXED_ENTRIES + PARTICLE_COLORS.len();

/// What a pixel is for, rather than which RGB value it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaletteIntent {
    Background,
    Border,
    Pointer,
    PointerOutline,
    Hub,
    HubRing,
    Text,
    TextDark,
    Banner,
    BannerBorder,
    WinnerHighlight,
    /// Wraps around the particle colors.
    Particle(usize),
    /// Wraps around the segment colors in use.
    Segment(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedPalette {
    entries: Vec<Color32>,
    segment_colors: usize,
}

impl FixedPalette {
    /// Build the palette with `segment_colors` wheel colors (clamped to
    /// `1..=MAX_SEGMENT_COLORS`).
    pub fn new(segment_colors: usize) -> Self {
        let segment_colors = segment_colors.clamp(1, MAX_SEGMENT_COLORS);
        let mut entries = Vec::with_capacity(SEGMENT_BASE + segment_colors);
        entries.extend_from_slice(&[
            COLOR_BACKGROUND,
            COLOR_BORDER,
            COLOR_POINTER,
            COLOR_POINTER_OUTLINE,
            COLOR_HUB,
            COLOR_HUB_RING,
            COLOR_TEXT,
            COLOR_TEXT_DARK,
            COLOR_BANNER,
            COLOR_BANNER_BORDER,
            COLOR_WINNER_HIGHLIGHT,
        ]);
        entries.extend_from_slice(&PARTICLE_COLORS);
        entries.extend_from_slice(&SEGMENT_COLORS[..segment_colors]);
        Self {
            entries,
            segment_colors,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn segment_colors(&self) -> usize {
        self.segment_colors
    }

    pub fn colors(&self) -> &[Color32] {
        &self.entries
    }

    pub fn index(&self, intent: PaletteIntent) -> u8 {
        let idx = match intent {
            PaletteIntent::Background => 0,
            PaletteIntent::Border => 1,
            PaletteIntent::Pointer => 2,
            PaletteIntent::PointerOutline => 3,
            PaletteIntent::Hub => 4,
            PaletteIntent::HubRing => 5,
            PaletteIntent::Text => 6,
            PaletteIntent::TextDark => 7,
            PaletteIntent::Banner => 8,
            PaletteIntent::BannerBorder => 9,
            PaletteIntent::WinnerHighlight => 10,
            PaletteIntent::Particle(n) => FIXED_ENTRIES + n % PARTICLE_COLORS.len(),
            PaletteIntent::Segment(n) => SEGMENT_BASE + n % self.segment_colors,
        };
        idx as u8
    }

    #[inline]
    pub fn pixel(&self, intent: PaletteIntent) -> EncodedPixel {
        EncodedPixel::from_index(self.index(intent))
    }

    pub fn color(&self, intent: PaletteIntent) -> Color32 {
        self.entries[self.index(intent) as usize]
    }

    /// Light or dark text, whichever reads better on `background`.
    pub fn contrast_text(&self, background: EncodedPixel) -> EncodedPixel {
        let bg = self
            .entries
            .get(background.index() as usize)
            .copied()
            .unwrap_or(COLOR_BACKGROUND);
        if bg.luma() > 150 {
            self.pixel(PaletteIntent::TextDark)
        } else {
            self.pixel(PaletteIntent::Text)
        }
    }

    /// Nearest palette entry to an arbitrary color. Ties go to the lower
    /// index.
    pub fn snap(&self, color: Color32) -> EncodedPixel {
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (idx, entry) in self.entries.iter().enumerate() {
            let dist = entry.distance_sq(color);
            if dist < best_dist {
                best = idx;
                best_dist = dist;
            }
        }
        EncodedPixel::from_index(best as u8)
    }

    /// Packed RGB triples for a GIF global color table, padded with black
    /// to the next power-of-two entry count.
    pub fn to_rgb_table(&self) -> Vec<u8> {
        let slots = self.entries.len().next_power_of_two().max(2);
        let mut table = Vec::with_capacity(slots * 3);
        for entry in &self.entries {
            table.extend_from_slice(&entry.to_rgb_bytes());
        }
        table.resize(slots * 3, 0);
        table
    }
}
