//! Errors surfaced by a spin.
//!
//! A spin either produces a winner (and optionally an encoded animation) or
//! fails with exactly one of these. Per-frame render problems are reported
//! as [`SpinError::RenderFrame`] to the log and the frame is skipped; only
//! losing every frame turns into a hard failure.

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinError {
    NoParticipants,
    PayloadTooLarge { size: usize, ceiling: usize },
    GenerationTimedOut { elapsed_ms: u64, budget_ms: u64 },
    RenderFrame { frame: usize, reason: String },
    NoFramesRendered,
    Encode(String),
    InvalidSettings(String),
}

impl fmt::Display for SpinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoParticipants => write!(f, "no participants to draw from"),
            Self::PayloadTooLarge { size, ceiling } => {
                write!(
                    f,
                    "encoded animation is {} bytes, over the {} byte ceiling",
                    size, ceiling
                )
            }
            Self::GenerationTimedOut {
                elapsed_ms,
                budget_ms,
            } => {
                write!(
                    f,
                    "generation stopped after {} ms (budget {} ms)",
                    elapsed_ms, budget_ms
                )
            }
            Self::RenderFrame { frame, reason } => {
                write!(f, "frame {} failed to render: {}", frame, reason)
            }
            Self::NoFramesRendered => write!(f, "no frames survived rendering"),
            Self::Encode(reason) => write!(f, "encoding failed: {}", reason),
            Self::InvalidSettings(reason) => write!(f, "invalid render settings: {}", reason),
        }
    }
}

impl std::error::Error for SpinError {}

impl From<gif::EncodingError> for SpinError {
    fn from(err: gif::EncodingError) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<image::ImageError> for SpinError {
    fn from(err: image::ImageError) -> Self {
        Self::Encode(err.to_string())
    }
}

pub type SpinResult<T = ()> = Result<T, SpinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_mentions_both_sizes() {
        let msg = SpinError::PayloadTooLarge {
            size: 12,
            ceiling: 10,
        }
        .to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn timeout_reports_budget() {
        let err = SpinError::GenerationTimedOut {
            elapsed_ms: 61_000,
            budget_ms: 60_000,
        };
        assert_eq!(
            err.to_string(),
            "generation stopped after 61000 ms (budget 60000 ms)"
        );
    }
}
