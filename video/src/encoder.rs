//! Animated GIF output under a byte ceiling.
//!
//! Frames arrive as indexed buffers sharing one global color table. Only
//! the rectangle that changed since the previous frame is stored, and the
//! decoder keeps everything else (disposal "keep"). A frame identical to
//! the one before it just lengthens the previous frame's delay.

use std::borrow::Cow;

use gif::{DisposalMethod, Frame, Repeat};
use tracing::debug;

use wheelspin_abi::damage::DamageRect;
use wheelspin_gfx::DrawBuffer;

use crate::error::{SpinError, SpinResult};

/// Common free-tier upload limit.
pub const DEFAULT_CEILING_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedGif {
    pub bytes: Vec<u8>,
    /// Frames actually stored after merging duplicates.
    pub frames: usize,
    pub width: u16,
    pub height: u16,
}

impl EncodedGif {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

struct PendingFrame {
    rect: DamageRect,
    pixels: Vec<u8>,
    delay: u16,
}

pub struct SizeBudgetedEncoder {
    encoder: gif::Encoder<Vec<u8>>,
    previous: Option<DrawBuffer>,
    pending: Option<PendingFrame>,
    width: u16,
    height: u16,
    ceiling: usize,
    written: usize,
    pushed: usize,
}

impl SizeBudgetedEncoder {
    pub fn new(width: u16, height: u16, palette_rgb: &[u8], ceiling: usize) -> SpinResult<Self> {
        if width == 0 || height == 0 {
            return Err(SpinError::InvalidSettings("empty GIF canvas".into()));
        }
        if palette_rgb.is_empty() || palette_rgb.len() % 3 != 0 || palette_rgb.len() > 256 * 3 {
            return Err(SpinError::InvalidSettings(format!(
                "color table of {} bytes is not 1..=256 RGB triples",
                palette_rgb.len()
            )));
        }
        let mut encoder = gif::Encoder::new(Vec::new(), width, height, palette_rgb)?;
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self {
            encoder,
            previous: None,
            pending: None,
            width,
            height,
            ceiling,
            written: 0,
            pushed: 0,
        })
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Frames pushed so far, duplicates included.
    pub fn frames_pushed(&self) -> usize {
        self.pushed
    }

    pub fn push_frame(&mut self, frame: &DrawBuffer, delay_cs: u16) -> SpinResult {
        if frame.width() != self.width as u32 || frame.height() != self.height as u32 {
            return Err(SpinError::Encode(format!(
                "frame is {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        self.pushed += 1;

        let rect = match &self.previous {
            None => DamageRect::full(frame.width(), frame.height()),
            Some(prev) => match frame.diff_bounds(prev) {
                Some(rect) => rect,
                None => {
                    if let Some(pending) = self.pending.as_mut() {
                        pending.delay = pending.delay.saturating_add(delay_cs);
                    }
                    return Ok(());
                }
            },
        };

        self.flush_pending()?;
        self.pending = Some(PendingFrame {
            rect,
            pixels: frame.crop(&rect),
            delay: delay_cs,
        });
        match self.previous.as_mut() {
            Some(prev) => prev.clone_from(frame),
            None => self.previous = Some(frame.clone()),
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> SpinResult {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let frame = Frame {
            left: pending.rect.x0 as u16,
            top: pending.rect.y0 as u16,
            width: pending.rect.width() as u16,
            height: pending.rect.height() as u16,
            delay: pending.delay,
            dispose: DisposalMethod::Keep,
            buffer: Cow::Owned(pending.pixels),
            ..Frame::default()
        };
        self.encoder.write_frame(&frame)?;
        self.written += 1;
        Ok(())
    }

    /// Write the trailer and enforce the ceiling.
    pub fn finish(mut self) -> SpinResult<EncodedGif> {
        self.flush_pending()?;
        if self.written == 0 {
            return Err(SpinError::NoFramesRendered);
        }
        let frames = self.written;
        let (width, height, ceiling) = (self.width, self.height, self.ceiling);
        let bytes = self
            .encoder
            .into_inner()
            .map_err(|err| SpinError::Encode(err.to_string()))?;
        debug!(
            "encoded {} frames into {} bytes (ceiling {})",
            frames,
            bytes.len(),
            ceiling
        );
        if bytes.len() > ceiling {
            return Err(SpinError::PayloadTooLarge {
                size: bytes.len(),
                ceiling,
            });
        }
        Ok(EncodedGif {
            bytes,
            frames,
            width,
            height,
        })
    }
}
