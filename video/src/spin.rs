//! One spin, start to finish.
//!
//! `generate_spin` runs the whole pipeline on the calling thread: choose
//! settings, draw the winner, build the schedule, then render and encode
//! every frame in order. `spawn_spin` moves that onto the blocking pool
//! and enforces the deadline from the async side as well.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use image::{ImageFormat, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::encoder::{DEFAULT_CEILING_BYTES, EncodedGif, SizeBudgetedEncoder};
use crate::entries::{Participant, display_segments, total_entries};
use crate::error::{SpinError, SpinResult};
use crate::palette::FixedPalette;
use crate::particles::ParticleField;
use crate::render::{FrameRenderer, FrameState, WheelScene};
use crate::schedule::{RotationSchedule, SpinTuning, pick_turns, target_rotation};
use crate::selector::{SelectionKind, select_winner};
use crate::settings::{QualityOverride, RenderSettings, select_settings};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct SpinRequest {
    pub giveaway_name: String,
    pub participants: Vec<Participant>,
    pub skip_animation: bool,
    pub quality: QualityOverride,
    pub max_bytes: usize,
    pub timeout: Duration,
    pub tuning: SpinTuning,
}

impl SpinRequest {
    pub fn new(giveaway_name: impl Into<String>, participants: Vec<Participant>) -> Self {
        Self {
            giveaway_name: giveaway_name.into(),
            participants,
            skip_animation: false,
            quality: QualityOverride::Auto,
            max_bytes: DEFAULT_CEILING_BYTES,
            timeout: DEFAULT_TIMEOUT,
            tuning: SpinTuning::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Winner {
    /// Index into the request's participants.
    pub index: usize,
    pub participant: Participant,
    pub selection: SelectionKind,
    /// Rotation that parks the winner's segment under the pointer.
    pub target_rotation: f64,
}

#[derive(Clone, Debug)]
pub struct SpinOutcome {
    pub winner: Winner,
    /// `None` when the animation was skipped.
    pub animation: Option<EncodedGif>,
    pub settings: Option<RenderSettings>,
    /// `Encoded` for an animation, `InstantResult` when it was skipped.
    pub stage: SpinStage,
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    NoParticipants,
    TooLarge,
    TimedOut,
    NoFrames,
    Encode,
    InvalidSettings,
}

impl From<&SpinError> for FailureKind {
    fn from(err: &SpinError) -> Self {
        match err {
            SpinError::NoParticipants => FailureKind::NoParticipants,
            SpinError::PayloadTooLarge { .. } => FailureKind::TooLarge,
            SpinError::GenerationTimedOut { .. } => FailureKind::TimedOut,
            SpinError::RenderFrame { .. } | SpinError::NoFramesRendered => FailureKind::NoFrames,
            SpinError::Encode(_) => FailureKind::Encode,
            SpinError::InvalidSettings(_) => FailureKind::InvalidSettings,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinStage {
    Idle,
    SettingsChosen,
    WinnerDrawn,
    FramesRendered,
    Encoded,
    /// Winner announced without rendering.
    InstantResult,
    Failed(FailureKind),
}

impl SpinStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SpinStage::Encoded | SpinStage::InstantResult | SpinStage::Failed(_)
        )
    }
}

/// Stage bookkeeping for one spin. Stages only move forward.
#[derive(Debug)]
pub struct SpinTracker {
    stage: SpinStage,
}

impl Default for SpinTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinTracker {
    pub fn new() -> Self {
        Self {
            stage: SpinStage::Idle,
        }
    }

    pub fn stage(&self) -> SpinStage {
        self.stage
    }

    pub fn advance(&mut self, next: SpinStage) {
        debug!("spin stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    /// Record `err` as the terminal stage and hand it back.
    pub fn fail(&mut self, err: SpinError) -> SpinError {
        self.advance(SpinStage::Failed(FailureKind::from(&err)));
        err
    }
}

struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    fn new(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn check(&self, cancel: Option<&AtomicBool>) -> SpinResult {
        let elapsed = self.started.elapsed();
        let cancelled = cancel.is_some_and(|flag| flag.load(Ordering::Relaxed));
        if cancelled || elapsed > self.budget {
            return Err(SpinError::GenerationTimedOut {
                elapsed_ms: elapsed.as_millis() as u64,
                budget_ms: self.budget.as_millis() as u64,
            });
        }
        Ok(())
    }
}

fn winner_from<R: Rng + ?Sized>(
    request: &SpinRequest,
    mid_angle: f64,
    index: usize,
    selection: SelectionKind,
    rng: &mut R,
) -> Winner {
    Winner {
        index,
        participant: request.participants[index].clone(),
        selection,
        target_rotation: target_rotation(mid_angle, pick_turns(&request.tuning, rng)),
    }
}

/// Draw a winner without rendering anything.
pub fn instant_result<R: Rng + ?Sized>(request: &SpinRequest, rng: &mut R) -> SpinResult<Winner> {
    let pick = select_winner(&request.participants, rng)?;
    let palette = FixedPalette::new(1);
    let segments = display_segments(&request.participants, &palette);
    let mid = segments
        .get(pick.index)
        .map(|s| s.mid_angle())
        .unwrap_or_default();
    let winner = winner_from(request, mid, pick.index, pick.kind, rng);
    info!(
        "instant result for '{}': {} ({})",
        request.giveaway_name,
        winner.participant.label(),
        pick.kind.as_str()
    );
    Ok(winner)
}

/// Run a spin to completion on this thread.
///
/// `cancel` is polled between frames; raising it ends the spin with
/// `GenerationTimedOut`.
pub fn generate_spin<R: Rng + ?Sized>(
    request: &SpinRequest,
    rng: &mut R,
    cancel: Option<&AtomicBool>,
) -> SpinResult<SpinOutcome> {
    let mut tracker = SpinTracker::new();
    let deadline = Deadline::new(request.timeout);
    let participants = &request.participants;

    info!(
        "=== spinning '{}' for {} participants ({} entries) ===",
        request.giveaway_name,
        participants.len(),
        total_entries(participants)
    );

    if participants.is_empty() {
        return Err(tracker.fail(SpinError::NoParticipants));
    }

    if request.skip_animation {
        let winner = instant_result(request, rng).map_err(|e| tracker.fail(e))?;
        tracker.advance(SpinStage::WinnerDrawn);
        tracker.advance(SpinStage::InstantResult);
        return Ok(SpinOutcome {
            winner,
            animation: None,
            settings: None,
            stage: tracker.stage(),
            elapsed: deadline.started.elapsed(),
        });
    }

    let settings =
        select_settings(participants.len(), &request.quality).map_err(|e| tracker.fail(e))?;
    tracker.advance(SpinStage::SettingsChosen);
    debug!(
        "settings: {}px canvas, {} frames at {}cs, {} segment colors",
        settings.canvas_size,
        settings.total_frames(),
        settings.frame_delay_cs,
        settings.segment_colors
    );

    let pick = select_winner(participants, rng).map_err(|e| tracker.fail(e))?;
    let palette = FixedPalette::new(settings.segment_colors);
    let segments = display_segments(participants, &palette);
    let winner_mid = segments[pick.index].mid_angle();
    let schedule = RotationSchedule::for_winner(settings.frames, winner_mid, request.tuning, rng)
        .map_err(|e| tracker.fail(e))?;
    let winner = Winner {
        index: pick.index,
        participant: participants[pick.index].clone(),
        selection: pick.kind,
        target_rotation: schedule.target(),
    };
    tracker.advance(SpinStage::WinnerDrawn);
    info!(
        "winner: {} ({}), landing at {:.3} rad",
        winner.participant.label(),
        pick.kind.as_str(),
        winner.target_rotation
    );

    let particles = ParticleField::generate(settings.particle_count, rng);
    let scene = WheelScene {
        participants,
        segments: &segments,
        giveaway_name: &request.giveaway_name,
        winner_segment: pick.index,
        particles: &particles,
    };
    let size = settings.canvas_size as u16;
    let mut encoder =
        SizeBudgetedEncoder::new(size, size, &palette.to_rgb_table(), request.max_bytes)
            .map_err(|e| tracker.fail(e))?;
    let mut renderer = FrameRenderer::new(&settings, palette).map_err(|e| tracker.fail(e))?;

    let mut rendered = 0usize;
    for index in 0..schedule.total_frames() {
        deadline.check(cancel).map_err(|e| tracker.fail(e))?;
        let frame = FrameState::from_schedule(&schedule, index);
        match renderer.render(&scene, &frame) {
            Ok(buffer) => {
                encoder
                    .push_frame(buffer, settings.frame_delay_cs)
                    .map_err(|e| tracker.fail(e))?;
                rendered += 1;
            }
            Err(err) => warn!("skipping frame: {}", err),
        }
    }
    if rendered == 0 {
        return Err(tracker.fail(SpinError::NoFramesRendered));
    }
    tracker.advance(SpinStage::FramesRendered);

    deadline.check(cancel).map_err(|e| tracker.fail(e))?;
    let animation = encoder.finish().map_err(|e| tracker.fail(e))?;
    tracker.advance(SpinStage::Encoded);
    info!(
        "encoded {} of {} frames, {} bytes in {} ms",
        animation.frames,
        rendered,
        animation.len(),
        deadline.started.elapsed().as_millis()
    );

    Ok(SpinOutcome {
        winner,
        animation: Some(animation),
        settings: Some(settings),
        stage: tracker.stage(),
        elapsed: deadline.started.elapsed(),
    })
}

/// Single PNG of the stopped wheel with the winner highlighted.
pub fn render_result_png(request: &SpinRequest, winner: &Winner) -> SpinResult<Vec<u8>> {
    let settings = select_settings(request.participants.len(), &request.quality)?;
    let palette = FixedPalette::new(settings.segment_colors);
    let segments = display_segments(&request.participants, &palette);
    let particles = ParticleField::empty();
    let scene = WheelScene {
        participants: &request.participants,
        segments: &segments,
        giveaway_name: &request.giveaway_name,
        winner_segment: winner.index,
        particles: &particles,
    };
    let colors = palette.colors().to_vec();
    let mut renderer = FrameRenderer::new(&settings, palette)?;
    let buffer = renderer.render(&scene, &FrameState::result(winner.target_rotation))?;

    let image = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgba(&colors))
        .ok_or_else(|| SpinError::Encode("frame buffer does not match its dimensions".into()))?;
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

/// Run a spin on the blocking pool with the request's timeout.
///
/// With a `seed` the spin is reproducible; otherwise the RNG is seeded from
/// the OS.
pub async fn spawn_spin(request: SpinRequest, seed: Option<u64>) -> SpinResult<SpinOutcome> {
    let budget = request.timeout;
    let started = Instant::now();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);

    let handle = tokio::task::spawn_blocking(move || {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        generate_spin(&request, &mut rng, Some(&worker_cancel))
    });

    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(SpinError::Encode(format!("spin worker failed: {}", join))),
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            warn!("spin exceeded {} ms, cancelling", budget.as_millis());
            Err(SpinError::GenerationTimedOut {
                elapsed_ms: started.elapsed().as_millis() as u64,
                budget_ms: budget.as_millis() as u64,
            })
        }
    }
}
