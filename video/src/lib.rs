//! Weighted wheel spins rendered to size-bounded animated GIFs.
//!
//! Pipeline for one spin: participants become [`entries::WeightedSegment`]s,
//! [`selector`] draws the winner, [`schedule`] works out where the wheel is
//! on every frame, [`render`] draws each frame into an indexed surface
//! using the closed [`palette`], and [`encoder`] writes the GIF and checks
//! it against the byte ceiling. [`spin`] ties these together and
//! [`delivery`] hands the result to a front-end.

#![forbid(unsafe_code)]

pub mod delivery;
pub mod encoder;
pub mod entries;
pub mod error;
pub mod palette;
pub mod particles;
pub mod render;
pub mod schedule;
pub mod selector;
pub mod settings;
pub mod spin;

pub use delivery::{ResultSink, SpinReport, TextConsoleSink};
pub use encoder::{DEFAULT_CEILING_BYTES, EncodedGif, SizeBudgetedEncoder};
pub use entries::{Participant, WeightedSegment, build_segments, display_segments};
pub use error::{SpinError, SpinResult};
pub use palette::{FixedPalette, PaletteIntent};
pub use render::{FrameLayers, FrameRenderer, FrameState, WheelScene};
pub use schedule::{AnimationPhase, RotationSchedule, SpinTuning};
pub use selector::{Selection, SelectionKind, select_winner};
pub use settings::{PhaseFrames, QualityOverride, RenderSettings, Tier, select_settings};
pub use spin::{
    SpinOutcome, SpinRequest, SpinStage, SpinTracker, Winner, generate_spin, instant_result,
    render_result_png, spawn_spin,
};
